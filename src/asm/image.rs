//! Program image files.
//!
//! An image is the JSON serialisation of a [`ProgramImage`]: the
//! instruction list plus any preloaded data segments.

use crate::machine::program::ProgramImage;
use std::path::Path;
use thiserror::Error;

/// Load an image from disk.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ProgramImage, ImageError> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ImageError::IoError(e.to_string()))?;
    parse_image(&text)
}

/// Parse an image from JSON text.
///
/// Register operands must name one of the machine's registers.
pub fn parse_image(text: &str) -> Result<ProgramImage, ImageError> {
    let image: ProgramImage =
        serde_json::from_str(text).map_err(|e| ImageError::ParseError(e.to_string()))?;
    if let Some((index, reg)) = image.invalid_register() {
        return Err(ImageError::BadRegister { index, reg });
    }
    Ok(image)
}

/// Render an image as pretty-printed JSON.
pub fn render_image(image: &ProgramImage) -> Result<String, ImageError> {
    serde_json::to_string_pretty(image).map_err(|e| ImageError::ParseError(e.to_string()))
}

/// Save an image to disk.
pub fn save_image<P: AsRef<Path>>(path: P, image: &ProgramImage) -> Result<(), ImageError> {
    let text = render_image(image)?;
    std::fs::write(path.as_ref(), text).map_err(|e| ImageError::IoError(e.to_string()))
}

/// Errors that can occur reading or writing images.
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("malformed image: {0}")]
    ParseError(String),

    #[error("instruction {index} names register {reg}, which does not exist")]
    BadRegister { index: usize, reg: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::instruction::{BinaryOp, Instruction};

    #[test]
    fn test_image_json_shape() {
        let image = ProgramImage::from_instructions(vec![
            Instruction::Binary { op: BinaryOp::Sub, dest: 1, a: 1, b: 4 },
            Instruction::Halt,
        ]);

        let text = render_image(&image).unwrap();
        assert!(text.contains(r#""instr": "binary""#));
        assert!(text.contains(r#""op": "sub""#));
        assert_eq!(parse_image(&text).unwrap(), image);
    }

    #[test]
    fn test_data_defaults_to_empty() {
        let image = parse_image(r#"{"instructions": [{"instr": "halt"}]}"#).unwrap();
        assert_eq!(image.instructions, vec![Instruction::Halt]);
        assert!(image.data.is_empty());
    }

    #[test]
    fn test_malformed_image() {
        assert!(matches!(parse_image("{"), Err(ImageError::ParseError(_))));
        assert!(matches!(
            load_image("/nonexistent/image.json"),
            Err(ImageError::IoError(_))
        ));
    }

    #[test]
    fn test_out_of_range_register_rejected() {
        let text = r#"{"instructions": [
            {"instr": "literal", "dest": 40, "value": 1},
            {"instr": "halt"}
        ]}"#;
        assert!(matches!(
            parse_image(text),
            Err(ImageError::BadRegister { index: 0, reg: 40 })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("mmio-console-image-{}.json", std::process::id()));
        let image = ProgramImage::from_instructions(vec![Instruction::Nop, Instruction::Halt]);

        save_image(&path, &image).unwrap();
        let loaded = load_image(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, image);
    }
}
