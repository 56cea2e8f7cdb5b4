//! Pressure Stall Information (`/proc/pressure/{cpu,memory,io}`) parsing.

/// One line (`some` or `full`) of a PSI file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PsiLine {
    pub avg10: f64,
    pub avg60: f64,
    pub avg300: f64,
    pub total: u64,
}

/// Both lines of a PSI file.
#[derive(Debug, Clone, Copy, Default)]
pub struct Psi {
    pub some: PsiLine,
    pub full: PsiLine,
}

/// Parses a PSI file's contents. Each line starts with `some` or `full`
/// followed by `key=value` tokens; unrecognized leading words are ignored.
pub fn parse_psi(content: &str) -> Psi {
    let mut psi = Psi::default();
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let Some(category) = parts.next() else {
            continue;
        };
        let mut parsed = PsiLine::default();
        for token in parts {
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };
            match key {
                "avg10" => parsed.avg10 = value.parse().unwrap_or(0.0),
                "avg60" => parsed.avg60 = value.parse().unwrap_or(0.0),
                "avg300" => parsed.avg300 = value.parse().unwrap_or(0.0),
                "total" => parsed.total = value.parse().unwrap_or(0),
                _ => {}
            }
        }
        match category {
            "some" => psi.some = parsed,
            "full" => psi.full = parsed,
            _ => {}
        }
    }
    psi
}
