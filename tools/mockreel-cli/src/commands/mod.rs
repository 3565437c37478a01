pub mod check;
pub mod info;
pub mod init;
pub mod plan;
pub mod record;

use anyhow::Context;
use mockreel_platform_core::StageRect;
use mockreel_scene_model::AspectRatio;

/// Longest edge of the stage when nothing else is known.
const STAGE_EDGE: f64 = 1080.0;

/// Stage bounds for a headless pass, sized to the aspect ratio.
pub fn default_stage(aspect: AspectRatio) -> StageRect {
    match aspect {
        AspectRatio::Square => StageRect::new(0.0, 0.0, STAGE_EDGE, STAGE_EDGE),
        AspectRatio::Vertical => {
            StageRect::new(0.0, 0.0, STAGE_EDGE * aspect.ratio(), STAGE_EDGE)
        }
    }
}

/// Parse `x,y,width,height`.
pub fn parse_stage(value: &str) -> anyhow::Result<StageRect> {
    let parts = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid stage coordinate '{part}'"))
        })
        .collect::<anyhow::Result<Vec<f64>>>()?;
    let [x, y, width, height] = parts.as_slice() else {
        anyhow::bail!("Stage must be x,y,width,height, got '{value}'");
    };
    let rect = StageRect::new(*x, *y, *width, *height);
    if rect.is_empty() {
        anyhow::bail!("Stage must have a positive width and height");
    }
    Ok(rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stage_rect() {
        let rect = parse_stage("10, 20,640.5,480").unwrap();
        assert_eq!(rect, StageRect::new(10.0, 20.0, 640.5, 480.0));
    }

    #[test]
    fn rejects_malformed_stage() {
        assert!(parse_stage("1,2,3").is_err());
        assert!(parse_stage("a,b,c,d").is_err());
        assert!(parse_stage("0,0,0,100").is_err());
    }

    #[test]
    fn vertical_stage_is_taller_than_wide() {
        let stage = default_stage(AspectRatio::Vertical);
        assert_eq!(stage.height, 1080.0);
        assert!((stage.width - 607.5).abs() < 1e-9);
    }
}
