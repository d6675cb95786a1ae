use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};

/// A PBR map shipped in an ambientCG PNG archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TextureKind {
    Color,
    Metalness,
    Roughness,
    NormalGL,
    Displacement,
}

impl TextureKind {
    pub const ALL: [Self; 5] = [
        Self::Color,
        Self::Metalness,
        Self::Roughness,
        Self::NormalGL,
        Self::Displacement,
    ];

    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Color => "_Color.png",
            Self::Metalness => "_Metalness.png",
            Self::Roughness => "_Roughness.png",
            Self::NormalGL => "_NormalGL.png",
            Self::Displacement => "_Displacement.png",
        }
    }

    /// Only the color map carries sRGB data.
    pub const fn colorspace(self) -> &'static str {
        match self {
            Self::Color => "sRGB",
            _ => "Non-Color",
        }
    }

    /// Principled BSDF input the map ends up driving.
    pub const fn shader_input(self) -> &'static str {
        match self {
            Self::Color => "Base Color",
            Self::Metalness => "Metallic",
            Self::Roughness => "Roughness",
            Self::NormalGL => "Normal (via Normal Map)",
            Self::Displacement => "Displacement (via Displacement)",
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| file_name.ends_with(kind.suffix()))
    }
}

impl fmt::Display for TextureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Color => "Color",
            Self::Metalness => "Metalness",
            Self::Roughness => "Roughness",
            Self::NormalGL => "NormalGL",
            Self::Displacement => "Displacement",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureMap {
    pub kind: TextureKind,
    pub path: PathBuf,
}

/// Texture maps found in one cache entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextureSet {
    pub maps: Vec<TextureMap>,
}

impl TextureSet {
    /// Classify the files directly inside `directory` by suffix.
    pub fn scan(directory: &Path) -> std::io::Result<Self> {
        let mut maps = Vec::new();

        for entry in std::fs::read_dir(directory)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(kind) = file_name.to_str().and_then(TextureKind::from_file_name) else {
                debug!("Ignoring {:?}", entry.path());
                continue;
            };
            maps.push(TextureMap {
                kind,
                path: entry.path(),
            });
        }

        maps.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.path.cmp(&b.path)));
        Ok(Self { maps })
    }

    pub fn get(&self, kind: TextureKind) -> Option<&TextureMap> {
        self.maps.iter().find(|map| map.kind == kind)
    }

    pub fn missing(&self) -> Vec<TextureKind> {
        TextureKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_suffix() {
        assert_eq!(
            TextureKind::from_file_name("Rock035_1K-PNG_Color.png"),
            Some(TextureKind::Color)
        );
        assert_eq!(
            TextureKind::from_file_name("Rock035_1K-PNG_NormalGL.png"),
            Some(TextureKind::NormalGL)
        );
        assert_eq!(TextureKind::from_file_name("Rock035_1K-PNG_NormalDX.png"), None);
        assert_eq!(TextureKind::from_file_name("Rock035_1K-PNG_Color.jpg"), None);
    }

    #[test]
    fn only_color_is_srgb() {
        for kind in TextureKind::ALL {
            let expected = if kind == TextureKind::Color { "sRGB" } else { "Non-Color" };
            assert_eq!(kind.colorspace(), expected);
        }
    }

    #[test]
    fn scan_orders_maps_and_ignores_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "Rock035_1K-PNG_Displacement.png",
            "Rock035_1K-PNG_Color.png",
            "Rock035_1K-PNG_NormalDX.png",
            "Rock035_1K-PNG_Roughness.png",
            "Rock035.usdc",
        ] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub_Color.png")).unwrap();

        let set = TextureSet::scan(dir.path()).unwrap();
        let kinds: Vec<_> = set.maps.iter().map(|m| m.kind).collect();

        assert_eq!(
            kinds,
            vec![
                TextureKind::Color,
                TextureKind::Roughness,
                TextureKind::Displacement
            ]
        );
        assert_eq!(
            set.missing(),
            vec![TextureKind::Metalness, TextureKind::NormalGL]
        );
    }

    #[test]
    fn scan_of_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TextureSet::scan(&dir.path().join("nope")).is_err());
    }
}
