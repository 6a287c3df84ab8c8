//! Curated lookup tables: common misspellings, velocity-mode abbreviations,
//! and visually confusable key pairs.
//!
//! Entries are sorted by key so lookups can use binary search. The lists are
//! hand-curated from observed fast-typing errors; extend freely, but keep the
//! sort order.

/// Word → common misspellings, lowercase.
const MISSPELLINGS: &[(&str, &[&str])] = &[
    ("and", &["adn", "nad", "annd"]),
    ("beautiful", &["beatiful", "beutiful", "beauitful"]),
    ("because", &["becuase", "becasue", "beacuse", "becuz"]),
    ("been", &["bene", "ben", "eben"]),
    ("beginning", &["begining", "beggining", "begginning"]),
    ("believe", &["beleive", "belive", "beleave"]),
    ("could", &["coudl", "cuold", "coud"]),
    ("definitely", &["definately", "definatly", "defintely", "defiantly"]),
    ("different", &["diffrent", "diferent"]),
    ("environment", &["enviroment", "enviornment", "envrionment"]),
    ("experience", &["experiance", "expereince", "expreience"]),
    ("friend", &["freind", "frend", "freend"]),
    ("from", &["form", "fom", "frmo"]),
    ("government", &["goverment", "governmnet", "govenrment"]),
    ("have", &["hvae", "ahve", "hve"]),
    ("immediately", &["immediatly", "imediately", "immidiatley"]),
    ("important", &["importnat", "importent", "improtant"]),
    ("necessary", &["neccessary", "necesary", "neccesary"]),
    ("people", &["poeple", "peopel", "ppl"]),
    ("probably", &["probaly", "porbably", "prolly"]),
    ("receive", &["recieve", "recive", "receve"]),
    ("said", &["siad", "sadi", "sid"]),
    ("should", &["shoudl", "shuold", "shoud"]),
    ("something", &["somthing", "somehting", "smth"]),
    ("successful", &["succesful", "successfull", "sucessful"]),
    ("technology", &["technolgy", "techonology"]),
    ("that", &["taht", "tath", "htat"]),
    ("the", &["teh", "hte", "th"]),
    ("their", &["thier", "ther", "tehir"]),
    ("they", &["tehy", "htey", "tey"]),
    ("this", &["thsi", "tihs", "htis"]),
    ("thought", &["thougt", "thougth", "thot"]),
    ("through", &["thorugh", "trough", "thru"]),
    ("together", &["togehter", "togather", "togheter"]),
    ("tomorrow", &["tommorow", "tommorrow", "tomorow"]),
    ("weird", &["wierd", "werd", "werid"]),
    ("which", &["wich", "whcih", "whihc"]),
    ("with", &["wiht", "wtih", "wth"]),
    ("would", &["woudl", "wuold", "woud"]),
    ("writing", &["writting", "writng", "wrtiting"]),
];

/// Full word → velocity-mode abbreviation, lowercase, sorted by full word.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("because", "bc"),
    ("been", "bn"),
    ("believe", "blv"),
    ("contract", "contrct"),
    ("could", "cld"),
    ("court", "crt"),
    ("defendant", "defdnt"),
    ("definitely", "def"),
    ("different", "diff"),
    ("environment", "env"),
    ("evidence", "evdnce"),
    ("experience", "exp"),
    ("friend", "frd"),
    ("from", "frm"),
    ("government", "gov"),
    ("growth", "grwth"),
    ("have", "hv"),
    ("immediately", "imm"),
    ("important", "imp"),
    ("investment", "invstmt"),
    ("judge", "jdge"),
    ("market", "mkt"),
    ("necessary", "nec"),
    ("people", "ppl"),
    ("plaintiff", "plntff"),
    ("probably", "prob"),
    ("receive", "rcv"),
    ("revenue", "rvn"),
    ("said", "sd"),
    ("should", "shd"),
    ("something", "smth"),
    ("stock", "stk"),
    ("technology", "tech"),
    ("testimony", "testmny"),
    ("that", "tht"),
    ("the", "th"),
    ("their", "thr"),
    ("they", "thy"),
    ("this", "ths"),
    ("thought", "thot"),
    ("through", "thru"),
    ("tomorrow", "tmrw"),
    ("with", "wth"),
    ("would", "wld"),
];

/// Visually confusable characters (mirror-image and shape-alike pairs).
const VISUAL_CONFUSIONS: &[(char, char)] = &[
    ('0', 'o'),
    ('a', 'e'),
    ('b', 'd'),
    ('d', 'b'),
    ('e', 'a'),
    ('g', 'q'),
    ('i', 'l'),
    ('l', 'i'),
    ('m', 'n'),
    ('n', 'm'),
    ('o', '0'),
    ('p', 'q'),
    ('q', 'p'),
    ('u', 'v'),
    ('v', 'u'),
];

/// Known misspellings for a lowercase word, if curated.
pub fn misspellings_for(word: &str) -> Option<&'static [&'static str]> {
    MISSPELLINGS
        .binary_search_by(|(w, _)| w.cmp(&word))
        .ok()
        .map(|idx| MISSPELLINGS[idx].1)
}

/// Curated abbreviation for a lowercase word, if any.
pub fn abbreviation_for(word: &str) -> Option<&'static str> {
    ABBREVIATIONS
        .binary_search_by(|(w, _)| w.cmp(&word))
        .ok()
        .map(|idx| ABBREVIATIONS[idx].1)
}

/// Visually confusable replacement for a lowercase character, if any.
pub fn visual_confusion_for(c: char) -> Option<char> {
    VISUAL_CONFUSIONS
        .binary_search_by(|(k, _)| k.cmp(&c))
        .ok()
        .map(|idx| VISUAL_CONFUSIONS[idx].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_sorted_for_binary_search() {
        assert!(MISSPELLINGS.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(ABBREVIATIONS.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(VISUAL_CONFUSIONS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn lookups_hit_and_miss() {
        assert!(misspellings_for("the").is_some_and(|m| m.contains(&"teh")));
        assert!(misspellings_for("xylophone").is_none());
        assert_eq!(abbreviation_for("tomorrow"), Some("tmrw"));
        assert_eq!(abbreviation_for("zebra"), None);
        assert_eq!(visual_confusion_for('b'), Some('d'));
        assert_eq!(visual_confusion_for('z'), None);
    }
}
