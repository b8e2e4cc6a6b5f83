use console::{Emoji, style};

pub static SUCCESS_ICON: Emoji<'_, '_> = Emoji("✅ ", "");
pub static INFO_ICON: Emoji<'_, '_> = Emoji("ℹ️  ", "");
pub static WARN_ICON: Emoji<'_, '_> = Emoji("⚠️  ", "");
pub static ERROR_ICON: Emoji<'_, '_> = Emoji("❌ ", "");
pub static PEN: Emoji<'_, '_> = Emoji("✍️  ", "");
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");

pub fn print_success(msg: &str) {
    println!("{} {}", SUCCESS_ICON, style(msg).green());
}

pub fn print_info(msg: &str) {
    println!("{} {}", INFO_ICON, style(msg).blue());
}

pub fn print_warn(msg: &str) {
    println!("{} {}", WARN_ICON, style(msg).yellow());
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", ERROR_ICON, style(msg).red().bold());
}

pub fn print_status(label: &str, msg: &str) {
    println!("  {} {}: {}", GEAR, style(label).bold().cyan(), msg);
}

pub fn print_banner() {
    let lines: &[&str] = &[
        "     _            __ _      _           _    ",
        "  __| |_ __ __ _ / _| |_ __| | ___  ___| | __",
        " / _` | '__/ _` | |_| __/ _` |/ _ \\/ __| |/ /",
        "| (_| | | | (_| |  _| || (_| |  __/ (__|   < ",
        " \\__,_|_|  \\__,_|_|  \\__\\__,_|\\___|\\___|_|\\_\\",
    ];
    println!();
    for line in lines {
        println!("{}", style(line).magenta().bold());
    }
    println!("{}\n", style("Review AI-drafted posts from your terminal.").cyan());
}

pub fn print_goodbye() {
    println!(
        "\n{} {}",
        PEN,
        style("Thanks for reviewing. See you next time!").bold().cyan()
    );
}

/// Help-screen section: a titled block of aligned command/description rows.
pub struct GuideSection {
    title: &'static str,
    rows: Vec<(&'static str, &'static str)>,
}

impl GuideSection {
    pub fn new(title: &'static str) -> Self {
        Self { title, rows: Vec::new() }
    }

    pub fn command(mut self, name: &'static str, description: &'static str) -> Self {
        self.rows.push((name, description));
        self
    }

    pub fn print(self) {
        println!(" {}", style(self.title).bold().underlined());
        let width = self.rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, description) in self.rows {
            // Pad before styling: ANSI escapes would throw off the column width.
            println!(
                "   {}   {}",
                style(format!("{name:width$}")).green(),
                style(description).dim()
            );
        }
        println!();
    }
}
