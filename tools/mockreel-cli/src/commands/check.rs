//! Check capture capabilities.

use mockreel_capture_engine::{get_backend, BackendKind};
use mockreel_common::config::{config_file_path, AppConfig};
use mockreel_platform_core::ContainerFormat;

pub fn run(config: &AppConfig, backend: &str) -> anyhow::Result<()> {
    println!("MockReel Capability Check");
    println!("{}", "=".repeat(50));

    let path = config_file_path();
    if path.exists() {
        println!("[OK] Config: {}", path.display());
    } else {
        println!("[--] Config: defaults ({} not found)", path.display());
    }

    for kind in [BackendKind::Simulated, BackendKind::Gstreamer] {
        let status = if kind.is_available() { "OK" } else { "--" };
        println!("[{status}] Backend '{}' built in", kind.as_str());
    }

    let kind: BackendKind = backend.parse()?;
    let backend = match get_backend(kind, None) {
        Ok(backend) => backend,
        Err(e) => {
            println!("[FAIL] {e}");
            return Ok(());
        }
    };

    println!();
    println!("Backend: {}", backend.name());
    let crop = if backend.supports_crop_target() { "OK" } else { "WARN" };
    println!("[{crop}] Region crop targets");
    for format in [ContainerFormat::Mp4, ContainerFormat::WebM] {
        let status = if backend.is_type_supported(format) { "OK" } else { "--" };
        println!("[{status}] {}", format.mime_type());
    }

    println!();
    println!("Preferred containers: {}", config.capture.container_preference.join(", "));
    println!(
        "Capture hints: {}x{} @ {} fps, {} bps",
        config.capture.ideal_width,
        config.capture.ideal_height,
        config.capture.ideal_frame_rate,
        config.capture.video_bits_per_second
    );
    Ok(())
}
