//! Background presets.
//!
//! Backgrounds are opaque style tokens understood by the rendering layer.
//! The presets below are the ones offered in the editor; any other token is
//! accepted as-is.

/// A named background token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundPreset {
    pub name: &'static str,
    pub token: &'static str,
}

/// Token of the "Noir Elegance" preset, used by the initial scene.
pub const DEFAULT_BACKGROUND: &str =
    "bg-[radial-gradient(ellipse_at_top,_#1a1a2e_0%,_#16213e_50%,_#0f0f0f_100%)]";

pub const BACKGROUND_PRESETS: [BackgroundPreset; 8] = [
    BackgroundPreset {
        name: "Noir Elegance",
        token: DEFAULT_BACKGROUND,
    },
    BackgroundPreset {
        name: "Slate",
        token: "bg-gradient-to-br from-slate-600 via-slate-800 to-black",
    },
    BackgroundPreset {
        name: "Twilight",
        token: "bg-gradient-to-br from-purple-900/80 via-slate-900 to-black",
    },
    BackgroundPreset {
        name: "Carbon",
        token: "bg-gradient-to-br from-neutral-700 via-zinc-900 to-black",
    },
    BackgroundPreset {
        name: "Forest",
        token: "bg-gradient-to-br from-green-800 via-emerald-900 to-black",
    },
    BackgroundPreset {
        name: "Luxury Gold",
        token: "bg-gradient-to-br from-yellow-600/50 via-gray-900 to-black",
    },
    BackgroundPreset {
        name: "Velvet",
        token: "bg-gradient-to-bl from-red-700/50 via-gray-900 to-black",
    },
    BackgroundPreset {
        name: "Cyber",
        token: "bg-gradient-to-tr from-cyan-600/50 via-gray-900 to-purple-600/50",
    },
];

/// Resolve a preset name (case-insensitive) or pass a raw token through.
pub fn resolve_background(name_or_token: &str) -> String {
    BACKGROUND_PRESETS
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name_or_token.trim()))
        .map(|preset| preset.token.to_string())
        .unwrap_or_else(|| name_or_token.to_string())
}

/// Preset name for a token, if it is one of the presets.
pub fn preset_name(token: &str) -> Option<&'static str> {
    BACKGROUND_PRESETS
        .iter()
        .find(|preset| preset.token == token)
        .map(|preset| preset.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_names_resolve_to_tokens() {
        assert_eq!(resolve_background("luxury gold"), BACKGROUND_PRESETS[5].token);
        assert_eq!(resolve_background("bg-red-500"), "bg-red-500");
    }

    #[test]
    fn default_background_is_noir() {
        assert_eq!(preset_name(DEFAULT_BACKGROUND), Some("Noir Elegance"));
        assert_eq!(preset_name("bg-red-500"), None);
    }
}
