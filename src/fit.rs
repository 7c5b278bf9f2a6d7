//! Image fit calculation.
//!
//! Given an image's intrinsic aspect ratio and the box it must occupy,
//! compute the rectangle the image is drawn into, relative to the box's top
//! left corner. `Cover` may overflow the box; the painter clips to it.

use crate::grid::{Rect, Size};
use crate::model::FitMode;

/// Compute the draw rectangle for an image inside `container`.
///
/// `image_ratio` is width / height. An unknown, non-finite or non-positive
/// ratio draws the image over the whole container.
pub fn fit_image(image_ratio: Option<f64>, container: Size, mode: FitMode) -> Rect {
    let full = Rect::new(0.0, 0.0, container.width, container.height);
    let Some(ratio) = image_ratio.filter(|r| r.is_finite() && *r > 0.0) else {
        return full;
    };
    if container.width <= 0.0 || container.height <= 0.0 {
        return full;
    }

    let container_ratio = container.width / container.height;
    match mode {
        FitMode::Contain => {
            if ratio > container_ratio {
                let height = container.width / ratio;
                Rect::new(0.0, (container.height - height) / 2.0, container.width, height)
            } else {
                let width = container.height * ratio;
                Rect::new((container.width - width) / 2.0, 0.0, width, container.height)
            }
        }
        FitMode::Cover => {
            if ratio > container_ratio {
                let width = container.height * ratio;
                Rect::new((container.width - width) / 2.0, 0.0, width, container.height)
            } else {
                let height = container.width / ratio;
                Rect::new(0.0, (container.height - height) / 2.0, container.width, height)
            }
        }
        FitMode::Fill | FitMode::Stretch => full,
    }
}
