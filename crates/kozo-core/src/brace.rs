//! 矩形面构件替换为等效支撑

use crate::element::{ElemId, Element};
use crate::error::{KozoError, Result};
use crate::frame::Frame;

impl Frame {
    /// 以 1 根（对角线 0-2）或 2 根（另加 1-3）支撑替换四节点面构件
    ///
    /// 支撑沿用面构件的断面，类型为 WALL→WBRACE、SLAB→SBRACE，两端铰接。
    /// 面构件本身隐藏而不删除，并记录生成的支撑。
    pub fn rect_to_brace(&mut self, id: ElemId, nbrace: usize) -> Result<Vec<ElemId>> {
        let plate = self.elem(id)?;
        let data = plate.plate("rect_to_brace")?;
        if plate.enods() != 4 {
            return Err(KozoError::InvalidInput(format!(
                "element {} is not rectangular",
                id
            )));
        }
        if !(1..=2).contains(&nbrace) {
            return Err(KozoError::InvalidInput(format!("nbrace {}", nbrace)));
        }
        if data.children.iter().any(Option::is_some) {
            return Err(KozoError::InvalidInput(format!(
                "element {} already has braces",
                id
            )));
        }
        let etype = plate
            .etype
            .brace_of()
            .ok_or(KozoError::NotPlateElem("rect_to_brace"))?;
        let sect = plate.sect;
        let n = plate.enodes.clone();
        if self.width(id)? * self.height(id)? < crate::math::EPSILON {
            return Err(KozoError::Degenerate("rect_to_brace"));
        }

        let diagonals = [[n[0], n[2]], [n[1], n[3]]];
        let mut braces = Vec::with_capacity(nbrace);
        for ends in diagonals.iter().take(nbrace) {
            let mut brace = Element::new_line(0, *ends, sect, etype)?;
            brace.set_pin_both();
            brace.parent = Some(id);
            braces.push(self.insert_elem(brace)?);
        }

        let plate = self.elem_mut(id)?;
        plate.hide = true;
        let data = plate.plate_mut("rect_to_brace")?;
        for (slot, &b) in data.children.iter_mut().zip(&braces) {
            *slot = Some(b);
        }
        tracing::debug!("element {} replaced by braces {:?}", id, braces);
        Ok(braces)
    }
}
