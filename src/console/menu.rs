// Menu definitions
//
// Each menu is an enum of its entries; the number shown to the operator is
// derived from the entry's position so text and parsing cannot drift apart.

use std::fmt::Write as _;

/// A selectable menu entry
pub trait MenuEntry: Copy + Sized + 'static {
    const TITLE: &'static str;
    const ENTRIES: &'static [Self];

    fn label(self) -> &'static str;

    /// Entry for the operator's answer (`"1"`, `" 2 "`, ...).
    fn parse(answer: &str) -> Option<Self> {
        let index: usize = answer.trim().parse().ok()?;
        index
            .checked_sub(1)
            .and_then(|i| Self::ENTRIES.get(i))
            .copied()
    }

    /// Menu text with a title line and one numbered line per entry
    fn render() -> String {
        let mut text = format!("\n--- {} ---\n", Self::TITLE);
        for (i, entry) in Self::ENTRIES.iter().enumerate() {
            let _ = writeln!(text, "{}) {}", i + 1, entry.label());
        }
        text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainChoice {
    Processes,
    SecureFiles,
    Quit,
}

impl MenuEntry for MainChoice {
    const TITLE: &'static str = "Main Menu";
    const ENTRIES: &'static [Self] = &[Self::Processes, Self::SecureFiles, Self::Quit];

    fn label(self) -> &'static str {
        match self {
            Self::Processes => "Process operations",
            Self::SecureFiles => "Secure file operations",
            Self::Quit => "Quit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessChoice {
    List,
    Filter,
    Kill,
    Back,
}

impl MenuEntry for ProcessChoice {
    const TITLE: &'static str = "Process Operations";
    const ENTRIES: &'static [Self] = &[Self::List, Self::Filter, Self::Kill, Self::Back];

    fn label(self) -> &'static str {
        match self {
            Self::List => "List processes",
            Self::Filter => "Search processes by name",
            Self::Kill => "Terminate a process",
            Self::Back => "Back to main menu",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecureChoice {
    Lock,
    Unlock,
    SetReadOnly,
    UnsetReadOnly,
    CheckPermissions,
    ListLocks,
    ShowAuditLog,
    Back,
}

impl SecureChoice {
    /// Whether the entry acts on a file and needs a path
    pub fn needs_target(self) -> bool {
        matches!(
            self,
            Self::Lock
                | Self::Unlock
                | Self::SetReadOnly
                | Self::UnsetReadOnly
                | Self::CheckPermissions
        )
    }
}

impl MenuEntry for SecureChoice {
    const TITLE: &'static str = "Secure File Operations";
    const ENTRIES: &'static [Self] = &[
        Self::Lock,
        Self::Unlock,
        Self::SetReadOnly,
        Self::UnsetReadOnly,
        Self::CheckPermissions,
        Self::ListLocks,
        Self::ShowAuditLog,
        Self::Back,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Lock => "Lock file",
            Self::Unlock => "Unlock file",
            Self::SetReadOnly => "Set read-only",
            Self::UnsetReadOnly => "Remove read-only",
            Self::CheckPermissions => "Check permissions",
            Self::ListLocks => "List locked files",
            Self::ShowAuditLog => "Show audit log",
            Self::Back => "Back to main menu",
        }
    }
}
