use consent_facts::{ConsentReport, ExtractionDetails, SentenceText};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

/// Longest sentence preview printed per line.
const PREVIEW_CHARS: usize = 100;

pub fn print_run(source: &str, report: &ConsentReport, details: &ExtractionDetails, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Extracting: {}", source), ansi::CYAN)));

    let stats = &details.stats;
    println!(
        "  {} segments  │  {} sentences  │  {} tokens  │  {} heading ranges  │  {} entities",
        stats.segments, stats.sentences, stats.tokens, stats.headings, stats.entities
    );

    println!("\n{}", palette.paint("━━━ Controller ━━━", ansi::GRAY));
    match &report.controller {
        Some(company) => {
            println!(
                "  {} {}",
                palette.bold(palette.paint(company.text.trim(), ansi::GREEN)),
                palette.paint(format!("span {}..={}", company.start_index, company.end_index), ansi::YELLOW)
            );
            match &report.controller_address {
                Some(address) => println!("  {} {}", palette.dim("address:"), palette.paint(address.text.trim(), ansi::BLUE)),
                None => println!("  {}", palette.dim("address: not found")),
            }
        }
        None => println!("{}", palette.dim("  Not found")),
    }

    println!("\n{}", palette.paint("━━━ Recipients ━━━", ansi::GRAY));
    if report.recipients.is_empty() {
        println!("{}", palette.dim("  None"));
    }
    for recipient in &report.recipients {
        println!("  • {}", palette.paint(preview(recipient), ansi::GREEN));
    }

    println!("\n{}", palette.paint("━━━ Retention ━━━", ansi::GRAY));
    match &report.retention.short {
        Some(period) => {
            let expires = period.expires.map(|d| d.to_string()).unwrap_or_else(|| "unspecified".to_string());
            println!(
                "  {} {}  {} {}",
                palette.bold(palette.paint(format!("{} years", period.years), ansi::GREEN)),
                palette.dim(format!("\"{}\"", period.text.trim())),
                palette.dim("│ expires:"),
                palette.paint(expires, ansi::YELLOW)
            );
        }
        None => println!("{}", palette.dim("  No period stated")),
    }
    print_sentences(&report.retention.sentences, &palette);

    for (title, sentences) in [("Access", &report.access), ("Erasure", &report.erasure), ("Deadline", &report.deadline)] {
        println!("\n{}", palette.paint(format!("━━━ {} ━━━", title), ansi::GRAY));
        if sentences.is_empty() {
            println!("{}", palette.dim("  Not found"));
        }
        print_sentences(sentences, &palette);
    }

    println!("\n{}", palette.paint("━━━ Data categories ━━━", ansi::GRAY));
    if report.data_categories.is_empty() {
        println!("{}", palette.dim("  None"));
    }
    for (category, sentences) in &report.data_categories {
        println!(
            "  {} {}",
            palette.paint(category, ansi::BLUE),
            palette.dim(format!("({} sentences)", sentences.len()))
        );
    }

    println!("\n{}", palette.paint("━━━ Rule hits ━━━", ansi::GRAY));
    for hits in &details.rule_hits {
        let count = hits.matches.len();
        println!(
            "  {} {}",
            palette.paint(format!("{:<22}", hits.rule), ansi::CYAN),
            if count > 0 {
                palette.paint(format!("✓ {} matches", count), ansi::GREEN)
            } else {
                palette.dim("✗ 0 matches")
            }
        );
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Build: {}",
        palette.paint(format!("{:?}", details.total), ansi::GREEN),
        palette.dim(format!("{:?}", details.build)),
    );
    for stage in &details.stages {
        println!("    {} {}", palette.paint(format!("{:<16}", stage.name), ansi::BLUE), palette.dim(format!("{:?}", stage.duration)));
    }
    println!();
}

fn print_sentences(sentences: &[SentenceText], palette: &ansi::Palette) {
    for sentence in sentences {
        println!(
            "    {} {}",
            palette.paint(format!("{}..={}", sentence.range.start, sentence.range.end), ansi::YELLOW),
            preview(&sentence.text)
        );
    }
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > PREVIEW_CHARS {
        format!("{}…", flat.chars().take(PREVIEW_CHARS).collect::<String>())
    } else {
        flat
    }
}
