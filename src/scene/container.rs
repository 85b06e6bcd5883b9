use crate::math::Rect;
use crate::scene::{Placement, SpineObject, Visibility};

/// Container variant grouping child spine objects. Update and draw fan out
/// to the children; bounds is the union of theirs.
#[derive(Default)]
pub struct SpineContainer {
    pub placement: Placement,
    pub visibility: Visibility,
    pub children: Vec<SpineObject>,
}

impl SpineContainer {
    pub const TYPE: &'static str = "spine.container";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, child: SpineObject) -> &mut Self {
        self.children.push(child);
        self
    }

    pub fn update(&mut self, delta: f32) {
        for child in self.children.iter_mut() {
            child.update(delta);
        }
    }

    pub fn calculate_bounds(&self) -> Rect {
        let mut bounds: Option<Rect> = None;
        for child in &self.children {
            let rect = child.calculate_bounds();
            bounds = Some(match bounds {
                Some(total) => total.union(&rect),
                None => rect,
            });
        }
        bounds.unwrap_or(Rect::ZERO)
    }
}
