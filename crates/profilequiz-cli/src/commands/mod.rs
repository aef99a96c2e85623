pub mod config;
pub mod export;
pub mod play;
pub mod score;
pub mod state;

use std::path::Path;

use profilequiz_core::QuizContent;

/// Content id used for stored state when none is given: the file stem.
pub fn content_id_for(path: &Path, id: Option<String>) -> String {
    id.unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "quiz".to_string())
    })
}

pub fn load_content(path: &Path) -> Result<QuizContent, Box<dyn std::error::Error>> {
    Ok(QuizContent::load(path)?)
}
