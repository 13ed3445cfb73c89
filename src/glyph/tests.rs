// src/glyph/tests.rs

use super::*;
use test_log::test;

const DIGIT_ASSET: &[u8] = include_bytes!("../../assets/digit.json");
const COLON_ASSET: &[u8] = include_bytes!("../../assets/colon.json");

/// The library built from the assets shipped in `assets/`.
pub(crate) fn shipped_library() -> GlyphLibrary {
    GlyphLibrary::load(&JsonStructureReader, DIGIT_ASSET, COLON_ASSET).unwrap()
}

fn asset(version: u16, fragments: Vec<Fragment>) -> StructureAsset {
    StructureAsset {
        version,
        palette: Palette {
            colors: vec![[0, 0, 0, 255]],
            materials: vec!["BMC_Plastic".to_string()],
            assets: vec!["PB_DefaultBrick".to_string()],
        },
        fragments,
    }
}

fn brick(color: u32) -> Fragment {
    Fragment {
        position: Vec3::new(0, 10 * color as i32, 0),
        size: Vec3::new(5, 5, 5),
        rotation: 0,
        color,
        material: 0,
        asset: 0,
        owner: 0,
    }
}

#[test]
fn every_supported_character_has_a_mask_in_either_case() {
    let supported = ('0'..='9').chain('A'..='Z').chain(std::iter::once(' '));
    for c in supported {
        let upper = segment_mask(c).unwrap();
        assert_eq!(segment_mask(c.to_ascii_lowercase()).unwrap(), upper, "{}", c);
        if c != ' ' {
            assert!(!upper.is_empty(), "{} lights nothing", c);
        }
    }
    assert_eq!(segment_mask(' ').unwrap(), Segments::empty());
}

#[test]
fn unsupported_characters_fail() {
    for c in ['!', '.', ':', ';', '-', 'é', '\n'] {
        assert_eq!(segment_mask(c), Err(DisplayError::UnsupportedCharacter(c)));
    }
}

#[test]
fn known_shared_masks() {
    let mask = |c| segment_mask(c).unwrap();
    assert_eq!(mask('H'), mask('K'));
    assert_eq!(mask('H'), mask('X'));
    assert_eq!(mask('U'), mask('W'));
    assert_eq!(mask('M'), mask('N'));
    assert_ne!(mask('U'), mask('V'));
    assert_eq!(mask('8'), Segments::all());
    assert_eq!(mask('1'), Segments::B | Segments::C);
}

#[test]
fn fragments_follow_lit_segments() {
    let library = shipped_library();
    let offset = Vec3::new(-4, 90, 0);

    let one = library.fragments_for('1', 0, offset).unwrap();
    assert_eq!(one.len(), 2);
    assert!(one.iter().all(|f| f.color == 0));
    // Upper and lower right segments sit at y = 55 in the template.
    assert!(one.iter().all(|f| f.position.y == 55 + 90 && f.position.x == -4));

    assert_eq!(library.fragments_for('8', 3, Vec3::ZERO).unwrap().len(), 7);
    assert!(library.fragments_for(' ', 0, Vec3::ZERO).unwrap().is_empty());
    assert_eq!(
        library.fragments_for('?', 0, Vec3::ZERO),
        Err(DisplayError::UnsupportedCharacter('?'))
    );
}

#[test]
fn colon_tables_are_remapped_onto_digit_tables() {
    let library = shipped_library();
    let palette = library.palette();
    assert_eq!(palette.materials, vec!["BMC_Plastic", "BMC_Glow"]);
    assert_eq!(palette.assets, vec!["PB_DefaultBrick"]);

    let colon = library.colon_fragments(0, Vec3::ZERO);
    assert_eq!(colon.len(), 2);
    for fragment in &colon {
        assert_eq!(palette.materials[fragment.material as usize], "BMC_Glow");
        assert_eq!(palette.assets[fragment.asset as usize], "PB_DefaultBrick");
    }
}

#[test]
fn unknown_colon_names_are_appended() {
    let digit = asset(STRUCTURE_VERSION, vec![brick(0)]);
    let mut colon = asset(STRUCTURE_VERSION, vec![brick(0)]);
    colon.palette.assets = vec!["PB_Round".to_string()];

    let library = GlyphLibrary::from_assets(digit, colon).unwrap();
    assert_eq!(library.palette().assets, vec!["PB_DefaultBrick", "PB_Round"]);
    assert_eq!(library.colon_fragments(0, Vec3::ZERO)[0].asset, 1);
}

#[test]
fn out_of_range_segment_colour_is_ignored() {
    let digit = asset(STRUCTURE_VERSION, vec![brick(0), brick(9)]);
    let colon = asset(STRUCTURE_VERSION, vec![]);
    let library = GlyphLibrary::from_assets(digit, colon).unwrap();
    // Only segment A has a fragment; '8' lights all seven.
    assert_eq!(library.fragments_for('8', 0, Vec3::ZERO).unwrap().len(), 1);
}

#[test]
fn dangling_table_index_is_rejected() {
    let mut bad = brick(0);
    bad.material = 4;
    let digit = asset(STRUCTURE_VERSION, vec![bad]);
    let colon = asset(STRUCTURE_VERSION, vec![]);
    assert!(matches!(
        GlyphLibrary::from_assets(digit, colon),
        Err(DisplayError::Asset(_))
    ));
}

#[test]
fn wrong_version_is_rejected() {
    let bytes = serde_json::to_vec(&asset(STRUCTURE_VERSION + 1, vec![])).unwrap();
    assert_eq!(
        JsonStructureReader.read(&bytes),
        Err(DisplayError::BadAssetVersion {
            found: STRUCTURE_VERSION + 1,
            expected: STRUCTURE_VERSION,
        })
    );
    assert_eq!(
        GlyphLibrary::load(&JsonStructureReader, &bytes, COLON_ASSET),
        Err(DisplayError::BadAssetVersion {
            found: STRUCTURE_VERSION + 1,
            expected: STRUCTURE_VERSION,
        })
    );
}

#[test]
fn garbage_is_not_an_asset() {
    assert!(matches!(
        JsonStructureReader.read(b"\x00\x01not json"),
        Err(DisplayError::Asset(_))
    ));
}

#[test]
fn rotated_fragment_swaps_horizontal_extent() {
    let mut fragment = brick(0);
    fragment.size = Vec3::new(5, 25, 10);
    fragment.rotation = 1;
    let (lo, hi) = fragment.bounds();
    assert_eq!(lo, Vec3::new(-25, -5, -10));
    assert_eq!(hi, Vec3::new(25, 5, 10));
}
