//! Consent-platform pattern tables.
//!
//! All vendor knowledge lives here as static data. Extending coverage means
//! appending an entry to the relevant table; entries are independent of each
//! other and nothing mutates the tables at runtime.
//!
//! Regex sources are shared with in-page scripts, so they must stay within
//! the syntax common to Rust's `regex` and JavaScript `RegExp` (no inline
//! flags, no look-around). Case-insensitivity is applied by both consumers.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Bumped whenever a table changes in a way worth noting in scan logs.
pub const PATTERN_TABLES_VERSION: u32 = 4;

/// Static, append-only vendor pattern tables.
#[derive(Debug)]
pub struct PatternTables {
    /// Table revision
    pub version: u32,
    /// Hosts whose requests are aborted before they load (subdomains included)
    pub block_domains: &'static [&'static str],
    /// Known accept buttons, tried in order
    pub accept_selectors: &'static [&'static str],
    /// Whole-label accept phrases for role/text matching (regex source)
    pub accept_text: &'static str,
    /// Exact lowercase accept labels for the shadow-DOM fallback
    pub accept_exact: &'static [&'static str],
    /// Whole-word accept/allow/agree family for short labels (regex source)
    pub accept_fuzzy: &'static str,
    /// Labels that must never be fuzzily accepted (regex source)
    pub accept_exclude: &'static str,
    /// Longest label, in characters, that the fuzzy expression may match
    pub fuzzy_max_chars: usize,
    /// Banner containers hidden by force-hide
    pub container_selectors: &'static [&'static str],
    /// Iframes that host cross-origin consent UI
    pub iframe_selectors: &'static [&'static str],
    /// Exact banner ids/class names (compared case-insensitively)
    pub banner_ids: &'static [&'static str],
    /// Banner id/class naming convention (regex source)
    pub banner_naming: &'static str,
    /// Text that marks an unrecognized overlay as consent UI (regex source)
    pub overlay_text: &'static str,
}

/// The built-in tables.
pub static PATTERNS: PatternTables = PatternTables {
    version: PATTERN_TABLES_VERSION,
    block_domains: &[
        "cdn.cookielaw.org",
        "geolocation.onetrust.com",
        "cookie-cdn.cookiepro.com",
        "consent.cookiebot.com",
        "consentcdn.cookiebot.com",
        "cdn.privacy-mgmt.com",
        "cmp.quantcast.com",
        "quantcast.mgr.consensu.org",
        "sdk.privacy-center.org",
        "consent.trustarc.com",
        "consent.truste.com",
        "app.usercentrics.eu",
        "web.cmp.usercentrics.eu",
        "cdn.iubenda.com",
        "app.termly.io",
        "cdn.cookie-script.com",
        "cdn.consentmanager.net",
        "cmp.osano.com",
        "cdn-cookieyes.com",
        "cookiehub.net",
    ],
    accept_selectors: &[
        "#onetrust-accept-btn-handler",
        "#accept-recommended-btn-handler",
        "#CybotCookiebotDialogBodyLevelButtonLevelOptinAllowAll",
        "#CybotCookiebotDialogBodyButtonAccept",
        "#didomi-notice-agree-button",
        ".qc-cmp2-summary-buttons button[mode='primary']",
        "#truste-consent-button",
        "[data-testid='uc-accept-all-button']",
        "#uc-btn-accept-banner",
        ".iubenda-cs-accept-btn",
        ".cmplz-accept",
        "#cookie_action_close_header",
        "#wt-cli-accept-all-btn",
        ".cky-btn-accept",
        "a._brlbs-btn-accept-all",
        "._brlbs-btn-accept-all",
        "[data-tid='banner-accept']",
        ".osano-cm-accept-all",
        "#cookiescript_accept",
        ".cmpboxbtnyes",
        ".cc-allow",
        ".cc-btn.cc-dismiss",
        "button[data-cookiebanner='accept_button']",
        "#gdpr-cookie-accept",
        ".js-accept-cookies",
        "button[id*='accept-all' i]",
        "button[class*='accept-all' i]",
    ],
    accept_text: concat!(
        "^\\s*(",
        // English
        "accept( all( cookies)?| cookies)?|i accept|allow( all)?( cookies)?|",
        "i agree|agree( and (close|continue))?|yes,? i agree|got it|",
        // German
        "alle (akzeptieren|annehmen|zulassen|cookies akzeptieren)|akzeptieren|",
        "annehmen|zustimmen|alle zustimmen|einverstanden|",
        // French
        "tout accepter|accepter( et (fermer|continuer))?|j'accepte|accepter les cookies|",
        // Dutch
        "alles accepteren|accepteren|akkoord|alle cookies (accepteren|toestaan)|",
        // Spanish
        "aceptar( todo| todas( las cookies)?| cookies)?|acepto|",
        // Italian
        "accetta( tutto| tutti| i cookie)?|accetto|acconsento|",
        // Romanian
        "accept(ă|a) toate|accept toate|accept(ă|a)|sunt de acord",
        ")\\s*[.!]?\\s*$",
    ),
    accept_exact: &[
        "accept all",
        "accept all cookies",
        "accept cookies",
        "accept",
        "i accept",
        "allow all",
        "allow all cookies",
        "allow cookies",
        "i agree",
        "agree",
        "got it",
        "alle akzeptieren",
        "akzeptieren",
        "alle annehmen",
        "zustimmen",
        "tout accepter",
        "accepter",
        "j'accepte",
        "alles accepteren",
        "accepteren",
        "akkoord",
        "aceptar",
        "aceptar todo",
        "aceptar todas",
        "accetta",
        "accetta tutto",
        "accetto",
        "acceptă toate",
        "accepta toate",
        "accept toate",
    ],
    accept_fuzzy: r"(^|[^\p{L}])(accept|allow|agree|akzeptieren|zustimmen|accepte|accepter|aceptar|acepto|accetta|accetto|accettare|toestaan|akkoord)([^\p{L}]|$)",
    accept_exclude: "(reject|decline|deny|refuse|don'?t|do not|not now|only|necessary|settings|preferences|manage|customi[sz]e|options|ablehnen|einstellungen|refuser|param[eè]tres|rechazar|rifiuta|weigeren|respinge)",
    fuzzy_max_chars: 40,
    container_selectors: &[
        "#onetrust-banner-sdk",
        "#onetrust-consent-sdk",
        "#CybotCookiebotDialog",
        "#didomi-host",
        ".qc-cmp2-container",
        "#truste-consent-track",
        "#usercentrics-root",
        "#iubenda-cs-banner",
        ".cmplz-cookiebanner",
        "#cookie-law-info-bar",
        "#cookiescript_injected",
        "#BorlabsCookieBox",
        "#termly-code-snippet-support",
        "#cmpbox",
        ".cc-window",
        ".cky-consent-container",
        ".osano-cm-window",
        "#gdpr-cookie-message",
        "[id^='sp_message_container']",
        "[class*='cookie-banner']",
        "[class*='cookie-consent']",
        "[id*='cookie-banner']",
        "[aria-label*='cookie' i]",
    ],
    iframe_selectors: &[
        "iframe[id^='sp_message_iframe']",
        "iframe[src*='privacy-mgmt']",
        "iframe[src*='consent']",
        "iframe[src*='cmp']",
        "iframe[src*='trustarc']",
        "iframe[name*='consent' i]",
        "iframe[title*='consent' i]",
        "iframe[title*='cookie' i]",
        "iframe[title*='privacy' i]",
    ],
    banner_ids: &[
        "onetrust-banner-sdk",
        "onetrust-consent-sdk",
        "onetrust-pc-sdk",
        "CybotCookiebotDialog",
        "CybotCookiebotDialogBodyUnderlay",
        "didomi-host",
        "didomi-notice",
        "qc-cmp2-container",
        "truste-consent-track",
        "usercentrics-root",
        "iubenda-cs-banner",
        "cmplz-cookiebanner-container",
        "cookie-law-info-bar",
        "cookiescript_injected",
        "BorlabsCookieBox",
        "termly-code-snippet-support",
        "cmpbox",
        "cmpwrapper",
        "cookie-notice",
        "cookieConsent",
        "gdpr-cookie-message",
        "cky-consent-container",
        "osano-cm-window",
    ],
    banner_naming: concat!(
        "(^|[-_\\s])cookies?[-_]?(banner|consent|notice|bar|popup|law|wall|box|modal|overlay|message|layer)",
        "|gdpr",
        "|(^|[-_\\s])consent([-_]?(banner|manager|popup|box|modal|layer|wrapper|container|bar))?($|[-_\\s])",
        "|(^|[-_\\s])cmp([-_\\s]|$)",
        "|cybot|borlabs|termly",
    ),
    overlay_text: "cookie|consent|gdpr|privacy|datenschutz|einwillig|confidentialit|privacidad|riservatezza|toestemming",
};

/// Pattern tables with their expressions compiled.
#[derive(Debug)]
pub struct CompiledPatterns {
    tables: &'static PatternTables,
    accept_text: Regex,
    accept_fuzzy: Regex,
    accept_exclude: Regex,
    banner_naming: Regex,
    overlay_text: Regex,
}

impl CompiledPatterns {
    /// Compile the expressions of a table set.
    pub fn compile(tables: &'static PatternTables) -> Result<Self, regex::Error> {
        let build = |src: &str| RegexBuilder::new(src).case_insensitive(true).build();
        Ok(Self {
            tables,
            accept_text: build(tables.accept_text)?,
            accept_fuzzy: build(tables.accept_fuzzy)?,
            accept_exclude: build(tables.accept_exclude)?,
            banner_naming: build(tables.banner_naming)?,
            overlay_text: build(tables.overlay_text)?,
        })
    }

    /// The underlying tables.
    #[must_use]
    pub fn tables(&self) -> &'static PatternTables {
        self.tables
    }

    /// Whole-label multi-locale accept phrase.
    #[must_use]
    pub fn is_accept_phrase(&self, label: &str) -> bool {
        self.accept_text.is_match(label)
    }

    /// Exact accept label (labels are compared lowercased and trimmed).
    #[must_use]
    pub fn is_exact_accept(&self, label: &str) -> bool {
        let label = normalize_label(label);
        self.tables.accept_exact.iter().any(|p| *p == label)
    }

    /// Short label from the accept/allow/agree family that is not a refusal.
    #[must_use]
    pub fn is_fuzzy_accept(&self, label: &str) -> bool {
        let label = normalize_label(label);
        label.chars().count() <= self.tables.fuzzy_max_chars
            && self.accept_fuzzy.is_match(&label)
            && !self.accept_exclude.is_match(&label)
    }

    /// Whether an element id or class attribute names a banner container.
    #[must_use]
    pub fn is_banner_name(&self, id: &str, class: &str) -> bool {
        let listed = |token: &str| {
            self.tables
                .banner_ids
                .iter()
                .any(|known| known.eq_ignore_ascii_case(token))
        };
        if !id.is_empty() && listed(id) {
            return true;
        }
        if class.split_whitespace().any(listed) {
            return true;
        }
        (!id.is_empty() && self.banner_naming.is_match(id))
            || (!class.is_empty() && self.banner_naming.is_match(class))
    }

    /// Whether overlay text mentions cookies, consent or privacy.
    #[must_use]
    pub fn mentions_consent(&self, text: &str) -> bool {
        self.overlay_text.is_match(text)
    }
}

/// Lowercase, trim and collapse internal whitespace.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

static COMPILED: Lazy<CompiledPatterns> =
    Lazy::new(|| CompiledPatterns::compile(&PATTERNS).expect("valid regex"));

/// The built-in tables, compiled once.
pub fn compiled() -> &'static CompiledPatterns {
    &COMPILED
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_unique(name: &str, entries: &[&str]) {
        let mut seen = HashSet::new();
        for entry in entries {
            assert!(
                seen.insert(entry.to_lowercase()),
                "duplicate entry {entry:?} in {name}"
            );
        }
    }

    #[test]
    fn test_tables_compile() {
        let patterns = compiled();
        assert_eq!(patterns.tables().version, PATTERN_TABLES_VERSION);
    }

    #[test]
    fn test_tables_have_no_duplicates() {
        assert_unique("block_domains", PATTERNS.block_domains);
        assert_unique("accept_selectors", PATTERNS.accept_selectors);
        assert_unique("accept_exact", PATTERNS.accept_exact);
        assert_unique("container_selectors", PATTERNS.container_selectors);
        assert_unique("iframe_selectors", PATTERNS.iframe_selectors);
        assert_unique("banner_ids", PATTERNS.banner_ids);
    }

    #[test]
    fn test_exact_entries_are_normalized() {
        for entry in PATTERNS.accept_exact {
            assert_eq!(*entry, normalize_label(entry));
        }
    }

    #[test]
    fn test_block_domains_are_bare_hosts() {
        for domain in PATTERNS.block_domains {
            assert!(!domain.contains('/'), "{domain} has a path");
            assert!(!domain.starts_with('.'), "{domain} has a leading dot");
            assert_eq!(*domain, domain.to_lowercase());
        }
    }

    #[test]
    fn test_accept_phrases_across_locales() {
        let patterns = compiled();
        for label in [
            "Accept all",
            "ACCEPT ALL COOKIES",
            "I agree",
            "Alle akzeptieren",
            "Tout accepter",
            "Alles accepteren",
            "Aceptar todo",
            "Accetta tutto",
            "Acceptă toate",
            "  Got it! ",
        ] {
            assert!(patterns.is_accept_phrase(label), "{label:?} should match");
        }
        for label in ["Reject all", "Manage preferences", "Accept all and more text here", "Read our policy"] {
            assert!(!patterns.is_accept_phrase(label), "{label:?} should not match");
        }
    }

    #[test]
    fn test_fuzzy_accept() {
        let patterns = compiled();
        assert!(patterns.is_fuzzy_accept("Yes, accept and continue"));
        assert!(patterns.is_fuzzy_accept("allow"));
        assert!(!patterns.is_fuzzy_accept("Don't allow"));
        assert!(!patterns.is_fuzzy_accept("Accept only necessary"));
        assert!(!patterns.is_fuzzy_accept("We use cookies to improve your experience, please accept them"));
        assert!(!patterns.is_fuzzy_accept("Subscribe"));
    }

    #[test]
    fn test_fuzzy_accept_whole_words_only() {
        let patterns = compiled();
        for label in [
            "User Agreement",
            "Acceptable Use Policy",
            "Allowances",
            "Accepted payment methods",
            "Agreed terms",
        ] {
            assert!(!patterns.is_fuzzy_accept(label), "{label:?} should not match");
        }
        assert!(patterns.is_fuzzy_accept("Allow all cookies"));
        assert!(patterns.is_fuzzy_accept("J'accepte"));
        assert!(patterns.is_fuzzy_accept("Cookies akzeptieren"));
    }

    #[test]
    fn test_exact_accept_normalizes() {
        let patterns = compiled();
        assert!(patterns.is_exact_accept("  Accept   All "));
        assert!(!patterns.is_exact_accept("accept all now"));
    }

    #[test]
    fn test_banner_names() {
        let patterns = compiled();
        assert!(patterns.is_banner_name("onetrust-banner-sdk", ""));
        assert!(patterns.is_banner_name("ONETRUST-BANNER-SDK", ""));
        assert!(patterns.is_banner_name("", "wrapper cmpbox"));
        assert!(patterns.is_banner_name("site-cookie-notice", ""));
        assert!(patterns.is_banner_name("", "gdpr-modal is-open"));
        assert!(patterns.is_banner_name("consent", ""));
        assert!(patterns.is_banner_name("", "cmp-container"));
        assert!(patterns.is_banner_name("CybotCookiebotDialogFooter", ""));

        assert!(!patterns.is_banner_name("main-content", "article"));
        assert!(!patterns.is_banner_name("", "chocolate-cookie-recipe"));
        assert!(!patterns.is_banner_name("consentText", ""));
        assert!(!patterns.is_banner_name("", "cmpnt-header"));
    }

    #[test]
    fn test_overlay_text() {
        let patterns = compiled();
        assert!(patterns.mentions_consent("We value your PRIVACY"));
        assert!(patterns.mentions_consent("Wir verwenden Cookies"));
        assert!(!patterns.mentions_consent("Subscribe to our newsletter"));
    }
}
