//! Built-in thread catalogs.
//!
//! A representative subset of common embroidery floss ranges, loaded into a
//! [`MetaColorManager`](crate::registry::MetaColorManager) at startup.

use crate::registry::ColorRecord;

/// A static thread catalog: `(id, name, hex)` rows in catalog order.
#[derive(Debug)]
pub struct Catalog {
    pub id: &'static str,
    pub name: &'static str,
    colors: &'static [(&'static str, &'static str, &'static str)],
}

impl Catalog {
    /// Catalog rows as load records.
    pub fn records(&self) -> impl Iterator<Item = ColorRecord> + '_ {
        self.colors.iter().map(|(id, name, hex)| ColorRecord::new(*id, *name, *hex))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// DMC six-strand embroidery floss.
/// Reference: https://www.dmc.com/us/six-strand-embroidery-floss
static DMC: Catalog = Catalog {
    id: "dmc",
    name: "DMC Stranded Cotton",
    colors: &[
        ("B5200", "Snow White", "#FFFFFF"),
        ("White", "White", "#FCFBF8"),
        ("Ecru", "Ecru", "#F0EADA"),
        ("310", "Black", "#000000"),
        ("317", "Pewter Gray", "#6C6C6C"),
        ("318", "Light Steel Gray", "#ABABAB"),
        ("321", "Red", "#C72B3B"),
        ("340", "Medium Blue Violet", "#ADA7C7"),
        ("415", "Pearl Gray", "#D3D3D6"),
        ("552", "Medium Violet", "#803A6B"),
        ("602", "Medium Cranberry", "#E24874"),
        ("666", "Bright Red", "#E31D42"),
        ("699", "Green", "#056517"),
        ("700", "Bright Green", "#07731B"),
        ("702", "Kelly Green", "#47A72F"),
        ("725", "Medium Light Topaz", "#FFC840"),
        ("740", "Tangerine", "#FF8313"),
        ("754", "Light Peach", "#F7CBBF"),
        ("796", "Dark Royal Blue", "#11416D"),
        ("797", "Royal Blue", "#13477D"),
        ("820", "Very Dark Royal Blue", "#0E365C"),
        ("838", "Very Dark Beige Brown", "#594937"),
        ("898", "Very Dark Coffee Brown", "#492A13"),
        ("907", "Light Parrot Green", "#C7E666"),
        ("945", "Tawny", "#FBD5BB"),
        ("996", "Medium Electric Blue", "#30C2EC"),
        ("3371", "Black Brown", "#1E1108"),
        ("3713", "Very Light Salmon", "#FFE2E2"),
        ("3766", "Light Peacock Blue", "#99CFD9"),
        ("3865", "Winter White", "#F9F7F1"),
    ],
};

/// Anchor stranded cotton.
static ANCHOR: Catalog = Catalog {
    id: "anchor",
    name: "Anchor Stranded Cotton",
    colors: &[
        ("1", "White", "#FFFFFF"),
        ("2", "Snow White", "#FFFDF9"),
        ("46", "Bright Red", "#D0112B"),
        ("47", "Red", "#C72B3B"),
        ("131", "Royal Blue", "#2F5BA7"),
        ("133", "Dark Royal Blue", "#183A7F"),
        ("227", "Green", "#3C8D2F"),
        ("245", "Dark Green", "#1D6B2F"),
        ("297", "Yellow", "#FFD13B"),
        ("316", "Orange", "#F78F1E"),
        ("358", "Coffee Brown", "#5E3A1E"),
        ("382", "Black Brown", "#2B1C10"),
        ("398", "Light Gray", "#B9B9B9"),
        ("400", "Dark Gray", "#5C5C5C"),
        ("403", "Black", "#000000"),
    ],
};

/// Basic named colors for quick sketches.
static BASIC: Catalog = Catalog {
    id: "basic",
    name: "Basic Colors",
    colors: &[
        ("white", "White", "#FFFFFF"),
        ("black", "Black", "#000000"),
        ("red", "Red", "#FF0000"),
        ("green", "Green", "#00FF00"),
        ("blue", "Blue", "#0000FF"),
        ("yellow", "Yellow", "#FFFF00"),
        ("cyan", "Cyan", "#00FFFF"),
        ("magenta", "Magenta", "#FF00FF"),
        ("gray", "Gray", "#808080"),
    ],
};

static CATALOGS: &[&Catalog] = &[&DMC, &ANCHOR, &BASIC];

/// Returns the ids of all built-in catalogs, in load order.
pub fn list_builtins() -> Vec<&'static str> {
    CATALOGS.iter().map(|c| c.id).collect()
}

/// Returns a built-in catalog by id, or None if not found.
pub fn get_builtin(id: &str) -> Option<&'static Catalog> {
    CATALOGS.iter().copied().find(|c| c.id == id)
}
