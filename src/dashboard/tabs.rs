//! Tab navigation: exactly one panel is visible at a time.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Bots,
    Simulations,
    History,
    Wallet,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Bots, Tab::Simulations, Tab::History, Tab::Wallet];

    /// Name used on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Self::Bots => "bots",
            Self::Simulations => "sims",
            Self::History => "history",
            Self::Wallet => "wallet",
        }
    }

    /// Label shown in the tab bar.
    pub fn title(self) -> &'static str {
        match self {
            Self::Bots => "Bots",
            Self::Simulations => "Simulações",
            Self::History => "Histórico",
            Self::Wallet => "Carteira",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "bots" | "bot" => Some(Self::Bots),
            "sims" | "sim" | "simulations" | "simulation" => Some(Self::Simulations),
            "history" | "hist" => Some(Self::History),
            "wallet" => Some(Self::Wallet),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tabs {
    available: Vec<Tab>,
    active: Tab,
}

impl Tabs {
    /// Tabs over the enabled panels, first one active. The bots panel is
    /// always present.
    pub fn new(available: impl IntoIterator<Item = Tab>) -> Self {
        let mut tabs: Vec<Tab> = Vec::new();
        for tab in std::iter::once(Tab::Bots).chain(available) {
            if !tabs.contains(&tab) {
                tabs.push(tab);
            }
        }
        tabs.sort_by_key(|t| Tab::ALL.iter().position(|a| a == t));
        Self {
            active: tabs[0],
            available: tabs,
        }
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn is_active(&self, tab: Tab) -> bool {
        self.active == tab
    }

    pub fn available(&self) -> &[Tab] {
        &self.available
    }

    pub fn has(&self, tab: Tab) -> bool {
        self.available.contains(&tab)
    }

    /// Make `tab` the single active tab. Returns `false` for a tab that is
    /// not on the page.
    pub fn activate(&mut self, tab: Tab) -> bool {
        if !self.has(tab) {
            return false;
        }
        self.active = tab;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_bots_in_canonical_order() {
        let tabs = Tabs::new([Tab::Wallet, Tab::Simulations]);
        assert_eq!(tabs.active(), Tab::Bots);
        assert_eq!(tabs.available(), &[Tab::Bots, Tab::Simulations, Tab::Wallet]);
    }

    #[test]
    fn activation_is_exclusive() {
        let mut tabs = Tabs::new(Tab::ALL);
        assert!(tabs.activate(Tab::Wallet));
        assert!(tabs.is_active(Tab::Wallet));
        let active: Vec<Tab> = Tab::ALL.into_iter().filter(|t| tabs.is_active(*t)).collect();
        assert_eq!(active, vec![Tab::Wallet]);
    }

    #[test]
    fn missing_tab_cannot_be_activated() {
        let mut tabs = Tabs::new([Tab::Simulations]);
        assert!(!tabs.activate(Tab::Wallet));
        assert_eq!(tabs.active(), Tab::Bots);
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(Tab::parse("SIM"), Some(Tab::Simulations));
        assert_eq!(Tab::parse("wallet"), Some(Tab::Wallet));
        assert_eq!(Tab::parse("orders"), None);
    }
}
