//! Builtin function descriptions shown on hover.

use std::collections::HashMap;
use std::sync::LazyLock;

static BUILTINS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (
            "andika",
            "Kuandika thamani kwenye skrini (print)\nMfano: andika(\"Habari\")",
        ),
        (
            "jaza",
            "Kupokea maandishi kutoka kwa mtumiaji (input)\nMfano: fanya jina = jaza(\"Jina lako: \")",
        ),
        (
            "aina",
            "Kurudisha aina ya thamani (type)\nMfano: aina(5) // NAMBA",
        ),
        (
            "fungua",
            "Kufungua faili\nMfano: fanya faili = fungua(\"data.txt\")",
        ),
        (
            "namba",
            "Kubadilisha thamani kuwa namba (int)\nMfano: namba(\"10\")",
        ),
        (
            "tungo",
            "Kubadilisha thamani kuwa tungo (string)\nMfano: tungo(10)",
        ),
        (
            "mfululizo",
            "Kutengeneza orodha ya namba (range)\nMfano: mfululizo(1, 5) // [1, 2, 3, 4]",
        ),
    ])
});

/// Description of a builtin function, if `name` is one.
pub fn lookup(name: &str) -> Option<&'static str> {
    BUILTINS.get(name).copied()
}
