//! `.inl` 构件短表
//!
//! 每行一根线构件：`num sect n0 n1 cang <6 个释放> <12 个固端力>`。
//! 释放只列两端的转动自由度（各 3 个）；工况序号非 0 时固端力全部写 0。

use crate::error::Result;
use kozo_core::element::Element;
use kozo_core::frame::Frame;
use kozo_core::node::Node;
use kozo_core::KozoError;
use std::io::Write;

/// 节点行：`num x y z <6 个约束>`
pub fn inl_node_string(node: &Node) -> String {
    format!(
        "{:5} {:9.4} {:9.4} {:9.4} {}\n",
        node.num,
        node.x(),
        node.y(),
        node.z(),
        node.conf
            .iter()
            .map(|&c| if c { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join(" ")
    )
}

/// 构件行；面构件返回 `NotLineElem`
pub fn inl_elem_string(elem: &Element, period: usize) -> Result<String> {
    let cang = elem.cang().ok_or(KozoError::NotLineElem("inl_elem_string"))?;
    let mut s = format!(
        "{:5} {:4} {:5} {:5} {:8.5}",
        elem.num, elem.sect, elem.enodes[0], elem.enodes[1], cang
    );
    for end in 0..2 {
        for &b in &elem.end_bonds(end)[3..6] {
            s.push_str(if b { " 1" } else { " 0" });
        }
    }
    for &v in &elem.cmq {
        let v = if period == 0 { v } else { 0.0 };
        s.push_str(&format!(" {:.3}", v));
    }
    s.push('\n');
    Ok(s)
}

/// 输出节点表与线构件表，面构件跳过
pub fn write_inl<W: Write>(frame: &Frame, period: usize, writer: &mut W) -> Result<()> {
    let lines: Vec<&Element> = frame.elems().filter(|e| e.is_line()).collect();
    writeln!(writer, "{} {}", frame.node_count(), lines.len())?;
    for node in frame.nodes() {
        writer.write_all(inl_node_string(node).as_bytes())?;
    }
    for elem in &lines {
        writer.write_all(inl_elem_string(elem, period)?.as_bytes())?;
    }
    tracing::debug!("inl written: period {}, {} elements", period, lines.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kozo_core::element::Etype;

    fn pinned_girder() -> (Frame, u32) {
        let mut frame = Frame::new();
        let a = frame.coord_node(0.0, 0.0, 4.0);
        let b = frame.coord_node(6.0, 0.0, 4.0);
        let id = frame.add_line_elem([a, b], 201, Etype::Girder, None).unwrap();
        let elem = frame.elem_mut(id).unwrap();
        elem.set_pin_both();
        elem.cmq[8] = -30.0;
        (frame, id)
    }

    #[test]
    fn test_elem_row() {
        let (frame, id) = pinned_girder();
        let row = inl_elem_string(frame.elem(id).unwrap(), 0).unwrap();
        let cols: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(cols.len(), 5 + 6 + 12);
        assert_eq!(&cols[..5], &["1", "201", "1", "2", "0.00000"]);
        assert_eq!(&cols[5..11], &["0", "1", "1", "0", "1", "1"]);
        assert_eq!(cols[5 + 6 + 8], "-30.000");
    }

    #[test]
    fn test_cmq_zeroed_for_other_periods() {
        let (frame, id) = pinned_girder();
        let row = inl_elem_string(frame.elem(id).unwrap(), 1).unwrap();
        assert!(row.split_whitespace().skip(11).all(|c| c == "0.000"));
    }

    #[test]
    fn test_plate_rejected_and_skipped() {
        let (mut frame, _) = pinned_girder();
        let c = frame.coord_node(6.0, 0.0, 0.0);
        let d = frame.coord_node(0.0, 0.0, 0.0);
        let wall = frame.add_plate_elem(&[1, 2, c, d], 701, Etype::Wall, None).unwrap();
        assert!(inl_elem_string(frame.elem(wall).unwrap(), 0).is_err());

        let mut buf = Vec::new();
        write_inl(&frame, 0, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "4 1");
        assert_eq!(lines.len(), 1 + 4 + 1);
    }
}
