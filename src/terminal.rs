//! Plain-text renderer for the CLI

use moneta_core::{
    BalanceTone, DashboardView, Notification, NotificationLevel, Renderer, TransactionListView, TransactionType,
    TypeListView, User,
};
use std::fmt::Write;

/// Parts of the screen a command prints when it finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    User,
    Dashboard,
    Transactions,
    Types,
}

/// Keeps the latest view of each section; notifications print immediately
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    user: Option<User>,
    dashboard: Option<DashboardView>,
    transactions: Option<TransactionListView>,
    types: Option<TypeListView>,
    login_required: bool,
}

impl TerminalRenderer {
    pub fn login_required(&self) -> bool {
        self.login_required
    }

    pub fn print(&self, sections: &[Section]) {
        print!("{}", self.render(sections));
    }

    pub fn render(&self, sections: &[Section]) -> String {
        let mut out = String::new();
        for section in sections {
            match section {
                Section::User => {
                    if let Some(ref user) = self.user {
                        let _ = writeln!(out, "{} <{}> (id {})", user.name, user.email, user.id);
                    }
                }
                Section::Dashboard => {
                    if let Some(ref view) = self.dashboard {
                        out.push_str(&dashboard_text(view));
                    }
                }
                Section::Transactions => {
                    if let Some(ref view) = self.transactions {
                        out.push_str(&transactions_text(view));
                    }
                }
                Section::Types => {
                    if let Some(ref view) = self.types {
                        out.push_str(&types_text(view));
                    }
                }
            }
        }
        out
    }
}

impl Renderer for TerminalRenderer {
    fn show_login(&mut self) {
        self.login_required = true;
        self.user = None;
    }

    fn show_main(&mut self, user: &User) {
        self.login_required = false;
        self.user = Some(user.clone());
    }

    fn render_dashboard(&mut self, view: &DashboardView) {
        self.dashboard = Some(view.clone());
    }

    fn render_transactions(&mut self, view: &TransactionListView) {
        self.transactions = Some(view.clone());
    }

    fn render_types(&mut self, view: &TypeListView, _choices: &[TransactionType]) {
        self.types = Some(view.clone());
    }

    fn render_user(&mut self, user: &User) {
        self.user = Some(user.clone());
    }

    fn notify(&mut self, notification: &Notification) {
        let line = format!("[{}] {}", notification.level, notification.message);
        match notification.level {
            NotificationLevel::Error | NotificationLevel::Warning => eprintln!("{}", line),
            _ => println!("{}", line),
        }
    }
}

fn dashboard_text(view: &DashboardView) -> String {
    let mut out = String::new();
    match view.figures {
        Some(ref f) => {
            let tone = match f.tone {
                BalanceTone::Positive => "positive",
                BalanceTone::Negative => "negative",
                BalanceTone::Neutral => "even",
            };
            let _ = writeln!(out, "Income:       {}", f.total_income);
            let _ = writeln!(out, "Expenses:     {}", f.total_expense);
            let _ = writeln!(out, "Balance:      {} ({})", f.balance, tone);
        }
        None => {
            let _ = writeln!(out, "Balance:      unavailable");
        }
    }
    if view.is_filtered() {
        let _ = writeln!(out, "Transactions: {} ({} match the filter)", view.transaction_count, view.filtered_count);
    } else {
        let _ = writeln!(out, "Transactions: {}", view.transaction_count);
    }
    out.push('\n');
    out
}

fn transactions_text(view: &TransactionListView) -> String {
    let mut out = String::new();
    if view.is_empty() {
        let _ = writeln!(out, "No transactions found.");
        return out;
    }
    let _ = writeln!(out, "{:>6}  {:<16}  {:<24}  {:>16}", "ID", "DATE", "TYPE", "VALUE");
    for row in &view.rows {
        let _ = writeln!(out, "{:>6}  {:<16}  {:<24}  {:>16}", row.id, row.date, row.type_name, row.value);
    }
    if view.has_more {
        let _ = writeln!(out, "... {} more (use --pages to show more)", view.remaining);
    }
    out.push('\n');
    out
}

fn types_text(view: &TypeListView) -> String {
    let mut out = String::new();
    for (title, types) in [("Income types", &view.income), ("Expense types", &view.expense)] {
        let _ = writeln!(out, "{}:", title);
        if types.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for t in types.iter() {
            let _ = writeln!(out, "  {:>4}  {}", t.id, t.name);
        }
    }
    out.push('\n');
    out
}
