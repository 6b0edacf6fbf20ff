//! Deterministic memorable names for first-boot machines.
//!
//! The low 24 bits of a MAC address are the device-specific portion, as
//! opposed to the manufacturer OUI at the top. Four six-bit slices of
//! those bits index into a fixed word list, so the same MAC always gets
//! the same name while neighbouring devices still read distinctly.

use crate::machine::MacAddr;

const WORDS: [&str; 64] = [
    "acorn", "amber", "aspen", "badger", "basalt", "beacon", "birch", "breeze",
    "cedar", "cinder", "clover", "cobalt", "comet", "coral", "cosmos", "crane",
    "delta", "drift", "ember", "falcon", "fern", "flint", "gale", "garnet",
    "glacier", "grove", "harbor", "hazel", "heron", "indigo", "iris", "jasper",
    "juniper", "kestrel", "lagoon", "larch", "lichen", "linden", "lotus", "lynx",
    "maple", "marble", "meadow", "mesa", "mica", "nectar", "nimbus", "ocean",
    "onyx", "opal", "orchid", "osprey", "otter", "pebble", "pine", "quartz",
    "raven", "reef", "sage", "sparrow", "summit", "thistle", "tundra", "willow",
];

/// Generate the default name for a machine from its MAC address.
pub fn default_name(mac: &MacAddr) -> String {
    let bits = mac.as_u64();
    let word = |shift: u32| WORDS[((bits >> shift) & 0x3f) as usize];
    format!(
        "{}{}{}{}",
        capitalize(word(18)),
        capitalize(word(12)),
        capitalize(word(6)),
        capitalize(word(0)),
    )
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(s: &str) -> MacAddr {
        MacAddr::parse(s).unwrap()
    }

    #[test]
    fn test_default_name_is_deterministic() {
        let a = default_name(&mac("04:7c:16:eb:74:ed"));
        let b = default_name(&mac("04-7C-16-EB-74-ED"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_default_name_has_four_words() {
        let name = default_name(&mac("04:7c:16:eb:74:ed"));
        let capitals = name.chars().filter(|c| c.is_uppercase()).count();
        assert_eq!(capitals, 4);
    }

    #[test]
    fn test_neighbouring_macs_get_different_names() {
        // same OUI, one bit apart in the device portion
        let a = default_name(&mac("04:7c:16:eb:74:ed"));
        let b = default_name(&mac("04:7c:16:eb:74:ee"));
        assert_ne!(a, b);

        let c = default_name(&mac("04:7c:16:eb:75:ed"));
        assert_ne!(a, c);
    }
}
