use crate::annotation::VideoFigure;
use crate::error::CoreError;

/// Figures placed on one frame index.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index: u32,
    figures: Vec<VideoFigure>,
}

impl Frame {
    /// Group figures under `index`. Every figure must carry the same index.
    pub fn new(index: u32, figures: Vec<VideoFigure>) -> Result<Self, CoreError> {
        if let Some(stray) = figures.iter().find(|f| f.frame_index() != index) {
            return Err(CoreError::Validation(format!(
                "figure for frame {} cannot be placed on frame {index}",
                stray.frame_index()
            )));
        }
        Ok(Self { index, figures })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn figures(&self) -> &[VideoFigure] {
        &self.figures
    }
}
