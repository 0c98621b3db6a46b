//! `.inp` 文本格式
//!
//! 每个节点、断面、构件各输出一个文本块。线构件：
//!
//! ```text
//! ELEM  1001 ESECT 501 ENODS 2 ENOD 101 102 BONDS  0 0 0 0 0 0  0 0 0 0 0 0
//!            CANG 0.00000
//!            CMQ  0.000 ...
//!            TYPE GIRDER
//! ```
//!
//! 面构件把 CANG/CMQ 换成 EBANS 行，并在有开口时追加 WRECT。

use crate::error::Result;
use kozo_core::element::{Element, ElementKind};
use kozo_core::frame::Frame;
use kozo_core::node::Node;
use kozo_core::section::Section;
use std::fmt::Write as _;
use std::io::Write;

const INDENT: &str = "           ";

fn flags(bonds: &[bool]) -> String {
    bonds
        .chunks(6)
        .map(|end| {
            end.iter()
                .map(|&b| if b { "1" } else { "0" })
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("  ")
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn node_inp_string(node: &Node) -> String {
    let icon: Vec<u8> = node.conf.iter().map(|&c| u8::from(c)).collect();
    format!(
        "NODE {:5}  CORD {:9.4} {:9.4} {:9.4}  ICON {}  WEIGHT {:.3} {:.3} {:.3}\n",
        node.num,
        node.x(),
        node.y(),
        node.z(),
        join(&icon),
        node.weight.x,
        node.weight.y,
        node.weight.z,
    )
}

pub fn sect_inp_string(sect: &Section) -> String {
    let mut s = format!("PROP {:4} PNAME \"{}\"\n", sect.num, sect.name);
    let _ = writeln!(s, "{}KIND {}", INDENT, sect.kind);
    let _ = writeln!(s, "{}COLOR {:06X}", INDENT, sect.color);
    for fig in &sect.figures {
        let _ = write!(
            s,
            "{}FIG {:4} FPROP {} E {:.1} POI {:.4}",
            INDENT, fig.num, fig.material.num, fig.material.young, fig.material.poisson
        );
        for (key, value) in &fig.values {
            let _ = write!(s, " {} {:.6}", key.to_ascii_uppercase(), value);
        }
        s.push('\n');
    }
    s
}

pub fn elem_inp_string(elem: &Element) -> String {
    let n = elem.enodes.len();
    let mut s = format!(
        "ELEM {:5} ESECT {:3} ENODS {} ENOD {} ",
        elem.num,
        elem.sect,
        n,
        join(&elem.enodes)
    );
    match &elem.kind {
        ElementKind::Line(line) => {
            let _ = writeln!(s, "BONDS  {}", flags(&elem.bonds));
            let _ = writeln!(s, "{}CANG {:7.5}", INDENT, line.cang());
            let cmq: Vec<String> = elem.cmq.iter().map(|v| format!("{:.3}", v)).collect();
            let _ = writeln!(s, "{}CMQ  {}", INDENT, cmq.join(" "));
        }
        ElementKind::Plate(plate) => {
            let _ = writeln!(s, "BONDS {}", vec!["0"; 6 * n].join(" "));
            let _ = writeln!(
                s,
                "{}EBANS 1 EBAN 1 BNODS {} BNOD {}",
                INDENT,
                n,
                join(&elem.enodes)
            );
            let _ = writeln!(s, "{}TYPE {}", INDENT, elem.etype);
            if plate.wrect.iter().any(|&w| w != 0.0) {
                let _ = writeln!(s, "{}WRECT {:.4} {:.4}", INDENT, plate.wrect[0], plate.wrect[1]);
            }
            return s;
        }
    }
    let _ = writeln!(s, "{}TYPE {}", INDENT, elem.etype);
    s
}

/// 输出整个 Frame：表头计数，之后依次是断面、节点、构件
pub fn write_inp<W: Write>(frame: &Frame, writer: &mut W) -> Result<()> {
    writeln!(writer, "\"{}\"", frame.name)?;
    writeln!(writer, "NNODE {}", frame.node_count())?;
    writeln!(writer, "NELEM {}", frame.elem_count())?;
    writeln!(writer, "NPROP {}", frame.sects().count())?;
    writeln!(writer)?;
    for sect in frame.sects() {
        writer.write_all(sect_inp_string(sect).as_bytes())?;
    }
    writeln!(writer)?;
    for node in frame.nodes() {
        writer.write_all(node_inp_string(node).as_bytes())?;
    }
    writeln!(writer)?;
    for elem in frame.elems() {
        writer.write_all(elem_inp_string(elem).as_bytes())?;
    }
    tracing::info!(
        "inp written: {} nodes, {} elements",
        frame.node_count(),
        frame.elem_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kozo_core::element::Etype;
    use kozo_core::section::{Figure, Material};

    #[test]
    fn test_line_elem_block() {
        let mut frame = Frame::new();
        let a = frame.coord_node(0.0, 0.0, 0.0);
        let b = frame.coord_node(6.0, 0.0, 0.0);
        let id = frame
            .add_line_elem([a, b], 501, Etype::Girder, Some(1001))
            .unwrap();
        frame.elem_mut(id).unwrap().bonds[4] = true;
        frame.elem_mut(id).unwrap().cmq[2] = 12.5;

        let s = elem_inp_string(frame.elem(id).unwrap());
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "ELEM  1001 ESECT 501 ENODS 2 ENOD 1 2 BONDS  0 0 0 0 1 0  0 0 0 0 0 0"
        );
        assert_eq!(lines[1].trim(), "CANG 0.00000");
        assert!(lines[2].trim().starts_with("CMQ  0.000 0.000 12.500"));
        assert_eq!(lines[3].trim(), "TYPE GIRDER");
    }

    #[test]
    fn test_plate_elem_block() {
        let mut frame = Frame::new();
        let ids: Vec<_> = [(0.0, 0.0), (6.0, 0.0), (6.0, 3.0), (0.0, 3.0)]
            .iter()
            .map(|&(x, z)| frame.coord_node(x, 0.0, z))
            .collect();
        let id = frame.add_plate_elem(&ids, 701, Etype::Wall, None).unwrap();
        if let ElementKind::Plate(p) = &mut frame.elem_mut(id).unwrap().kind {
            p.wrect = [1.2, 2.0];
        }

        let s = elem_inp_string(frame.elem(id).unwrap());
        let lines: Vec<&str> = s.lines().collect();
        assert!(lines[0].contains("ENODS 4 ENOD 1 2 3 4 BONDS 0 0"));
        assert_eq!(lines[1].trim(), "EBANS 1 EBAN 1 BNODS 4 BNOD 1 2 3 4");
        assert_eq!(lines[2].trim(), "TYPE WALL");
        assert_eq!(lines[3].trim(), "WRECT 1.2000 2.0000");
    }

    #[test]
    fn test_write_inp_counts() {
        let mut frame = Frame::new();
        frame.name = "sample".into();
        let a = frame.coord_node(0.0, 0.0, 0.0);
        let b = frame.coord_node(0.0, 0.0, 3.5);
        frame.node_mut(a).unwrap().set_fix();
        frame.add_line_elem([a, b], 101, Etype::Column, None).unwrap();
        let steel = Material::new(1, "SN400", 2.05e7, 0.3);
        frame
            .add_sect(
                Section::new(101, "C1", Etype::Column)
                    .with_figure(Figure::new(1, steel).with_value("area", 0.02)),
            )
            .unwrap();

        let mut buf = Vec::new();
        write_inp(&frame, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("\"sample\"\nNNODE 2\nNELEM 1\nNPROP 1\n"));
        assert!(text.contains("PROP  101 PNAME \"C1\""));
        assert!(text.contains("AREA 0.020000"));
        assert!(text.contains("ICON 1 1 1 1 1 1"));
        assert!(text.contains("TYPE COLUMN"));
    }
}
