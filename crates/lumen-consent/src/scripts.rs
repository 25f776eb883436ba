//! In-page scripts.
//!
//! Scripts only harvest facts and act on element handles; the decisions
//! about what to click or hide are made in Rust. Every script starts with
//! a marker comment so logs and test doubles can tell them apart.
//!
//! Handles are indexes into a per-window array that the latest harvest
//! populated, so a click or hide must run in the same frame as the harvest
//! that produced its handle.

use crate::patterns::PatternTables;

/// Marker of the script registered to run before any page script.
pub const PROACTIVE_MARKER: &str = "/* lumen:proactive */";
/// Marker of the interactive-candidate harvest.
pub const HARVEST_MARKER: &str = "/* lumen:harvest */";
/// Marker of the click-by-handle script.
pub const CLICK_MARKER: &str = "/* lumen:click */";
/// Marker of the consent iframe hint collection.
pub const FRAME_HINTS_MARKER: &str = "/* lumen:frames */";
/// Marker of the overlay report.
pub const OVERLAYS_MARKER: &str = "/* lumen:overlays */";
/// Marker of the hide-by-handle script.
pub const HIDE_MARKER: &str = "/* lumen:hide */";
/// Marker of the scroll-lock reset.
pub const UNLOCK_MARKER: &str = "/* lumen:unlock */";

/// Inline overrides applied to every hidden element.
const HIDE_FN: &str = r"const hide = (el) => {
        el.style.setProperty('display', 'none', 'important');
        el.style.setProperty('visibility', 'hidden', 'important');
        el.style.setProperty('opacity', '0', 'important');
        el.setAttribute('data-lumen-hidden', '1');
    };";

const UNLOCK_FN: &str = r"const unlock = () => {
        let reset = 0;
        for (const el of [document.documentElement, document.body]) {
            if (!el) continue;
            const style = window.getComputedStyle(el);
            if (style.overflow === 'hidden' || style.overflowY === 'hidden') {
                el.style.setProperty('overflow', 'auto', 'important');
                el.style.setProperty('overflow-y', 'auto', 'important');
                reset += 1;
            }
        }
        return reset;
    };";

fn js_literal<T: serde::Serialize + ?Sized>(value: &T) -> String {
    // Serializing strings and string slices cannot fail
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// Watches the document from creation and hides banner containers as they
/// are inserted or renamed.
pub fn proactive(tables: &PatternTables) -> String {
    let denylist: Vec<String> = tables.banner_ids.iter().map(|id| id.to_lowercase()).collect();
    format!(
        r"{PROACTIVE_MARKER}
(() => {{
    if (window.__lumenProactive) return;
    window.__lumenProactive = true;
    const DENY = new Set({denylist});
    const NAMING = new RegExp({naming}, 'i');
    const PROTECTED = new Set(['HTML', 'HEAD', 'BODY', 'MAIN']);
    {HIDE_FN}
    {UNLOCK_FN}
    const classOf = (el) => typeof el.className === 'string'
        ? el.className
        : (el.getAttribute && el.getAttribute('class')) || '';
    const isBanner = (el) => {{
        if (!el || el.nodeType !== 1 || PROTECTED.has(el.tagName)) return false;
        const id = el.id || '';
        const cls = classOf(el);
        if (id && DENY.has(id.toLowerCase())) return true;
        for (const token of cls.split(/\s+/)) {{
            if (token && DENY.has(token.toLowerCase())) return true;
        }}
        return (id !== '' && NAMING.test(id)) || (cls !== '' && NAMING.test(cls));
    }};
    const sweep = (node) => {{
        if (!node || node.nodeType !== 1) return;
        if (isBanner(node)) {{
            if (node.getAttribute('data-lumen-hidden') !== '1') hide(node);
            return;
        }}
        for (const el of node.querySelectorAll('[id], [class]')) {{
            if (isBanner(el) && el.getAttribute('data-lumen-hidden') !== '1') hide(el);
        }}
    }};
    new MutationObserver((records) => {{
        for (const record of records) {{
            if (record.type === 'attributes') {{
                sweep(record.target);
            }} else {{
                for (const node of record.addedNodes) sweep(node);
            }}
        }}
    }}).observe(document, {{
        childList: true,
        subtree: true,
        attributes: true,
        attributeFilter: ['id', 'class'],
    }});
    const initial = () => {{
        const style = document.createElement('style');
        style.textContent = '[data-lumen-hidden=\'1\'] {{ display: none !important; visibility: hidden !important; opacity: 0 !important; }}';
        (document.head || document.documentElement).appendChild(style);
        sweep(document.documentElement);
        unlock();
    }};
    if (document.readyState === 'loading') {{
        document.addEventListener('DOMContentLoaded', initial, {{ once: true }});
    }} else {{
        initial();
    }}
}})();",
        denylist = js_literal(&denylist),
        naming = js_literal(tables.banner_naming),
    )
}

/// Collects visible interactive elements with their normalized labels.
///
/// With `shadow` set, open shadow roots are walked recursively and returned
/// as nested scopes; otherwise only the document scope is reported.
pub fn harvest(shadow: bool) -> String {
    format!(
        r"{HARVEST_MARKER}
(() => {{
    const INTERACTIVE = 'button, a, [role=\'button\'], [role=\'link\'], input[type=\'button\'], input[type=\'submit\'], [onclick]';
    const MAX_DEPTH = 8;
    const MAX_CANDIDATES = 2000;
    const handles = [];
    window.__lumenHandles = handles;
    const labelOf = (el) => (el.innerText || el.value || el.getAttribute('aria-label') || el.getAttribute('title') || el.textContent || '')
        .replace(/\s+/g, ' ').trim().toLowerCase();
    const rendered = (el) => {{
        const rect = el.getBoundingClientRect();
        return rect.width > 0 && rect.height > 0;
    }};
    // Links to another document are navigation, never consent controls
    const leavesPage = (el) => {{
        if (el.tagName !== 'A' || !el.hasAttribute('href')) return false;
        const href = el.getAttribute('href').trim();
        if (!href || href.startsWith('#') || /^javascript:/i.test(href)) return false;
        try {{
            const target = new URL(href, location.href);
            return target.origin + target.pathname + target.search
                !== location.origin + location.pathname + location.search;
        }} catch (e) {{
            return false;
        }}
    }};
    const walk = (root, depth) => {{
        const scope = {{ candidates: [], shadowRoots: [] }};
        for (const el of root.querySelectorAll(INTERACTIVE)) {{
            if (handles.length >= MAX_CANDIDATES) break;
            if (!rendered(el) || leavesPage(el)) continue;
            const text = labelOf(el);
            if (!text || text.length > 200) continue;
            scope.candidates.push({{ handle: handles.length, text }});
            handles.push(el);
        }}
        if ({shadow} && depth < MAX_DEPTH) {{
            for (const el of root.querySelectorAll('*')) {{
                if (el.shadowRoot) scope.shadowRoots.push(walk(el.shadowRoot, depth + 1));
            }}
        }}
        return scope;
    }};
    return walk(document, 0);
}})()"
    )
}

/// Clicks a handle from the latest harvest; resolves to whether it clicked.
pub fn click(handle: u32) -> String {
    format!(
        r"{CLICK_MARKER}
(() => {{
    const el = (window.__lumenHandles || [])[{handle}];
    if (!el || !el.isConnected) return false;
    el.click();
    return true;
}})()"
    )
}

/// Reports `src`/`name`/`id` of iframes matching the consent iframe selectors.
pub fn frame_hints(tables: &PatternTables) -> String {
    format!(
        r"{FRAME_HINTS_MARKER}
(() => {{
    const seen = new Set();
    const hints = [];
    for (const selector of {selectors}) {{
        let nodes = [];
        try {{ nodes = document.querySelectorAll(selector); }} catch (_) {{ continue; }}
        for (const frame of nodes) {{
            if (seen.has(frame)) continue;
            seen.add(frame);
            hints.push({{ src: frame.src || '', name: frame.name || '', id: frame.id || '' }});
        }}
    }}
    return hints;
}})()",
        selectors = js_literal(tables.iframe_selectors),
    )
}

/// Reports known banner containers and every fixed/sticky element.
pub fn overlays(tables: &PatternTables) -> String {
    format!(
        r"{OVERLAYS_MARKER}
(() => {{
    const seen = new Set();
    const handles = [];
    const candidates = [];
    window.__lumenOverlayHandles = handles;
    const describe = (el, source, style) => {{
        const rect = el.getBoundingClientRect();
        const z = parseInt(style.zIndex, 10);
        candidates.push({{
            handle: handles.length,
            source,
            width: rect.width,
            height: rect.height,
            opacity: parseFloat(style.opacity || '1'),
            hidden: el.getAttribute('data-lumen-hidden') === '1' || style.display === 'none' || style.visibility === 'hidden',
            position: style.position,
            zIndex: Number.isFinite(z) ? z : null,
            text: source === 'positioned' ? (el.innerText || '').slice(0, 2000) : '',
        }});
        handles.push(el);
    }};
    for (const selector of {containers}) {{
        let nodes = [];
        try {{ nodes = document.querySelectorAll(selector); }} catch (_) {{ continue; }}
        for (const el of nodes) {{
            if (seen.has(el)) continue;
            seen.add(el);
            describe(el, 'container', window.getComputedStyle(el));
        }}
    }}
    for (const el of document.querySelectorAll('body *')) {{
        if (seen.has(el)) continue;
        const style = window.getComputedStyle(el);
        if (style.position !== 'fixed' && style.position !== 'sticky') continue;
        seen.add(el);
        describe(el, 'positioned', style);
    }}
    return {{ viewport: {{ width: window.innerWidth, height: window.innerHeight }}, candidates }};
}})()",
        containers = js_literal(tables.container_selectors),
    )
}

/// Hides handles from the latest overlay report; resolves to the count hidden.
pub fn hide(handles: &[u32]) -> String {
    format!(
        r"{HIDE_MARKER}
(() => {{
    {HIDE_FN}
    const PROTECTED = new Set(['HTML', 'HEAD', 'BODY', 'MAIN']);
    const reported = window.__lumenOverlayHandles || [];
    let hidden = 0;
    for (const handle of {handles}) {{
        const el = reported[handle];
        if (!el || !el.isConnected || PROTECTED.has(el.tagName)) continue;
        hide(el);
        hidden += 1;
    }}
    return hidden;
}})()",
        handles = js_literal(handles),
    )
}

/// Resets `overflow: hidden` on the root and body; resolves to the count reset.
pub fn unlock_scroll() -> String {
    format!(
        r"{UNLOCK_MARKER}
(() => {{
    {UNLOCK_FN}
    return unlock();
}})()"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PATTERNS;

    #[test]
    fn test_proactive_embeds_denylist_and_naming() {
        let script = proactive(&PATTERNS);
        assert!(script.starts_with(PROACTIVE_MARKER));
        assert!(script.contains("\"onetrust-banner-sdk\""));
        assert!(script.contains("\"cybotcookiebotdialog\""));
        assert!(script.contains("MutationObserver"));
        assert!(script.contains("'important'"));
        assert!(script.contains("DOMContentLoaded"));
        assert!(script.contains("'BODY'"));
    }

    #[test]
    fn test_harvest_shadow_toggle() {
        assert!(harvest(true).contains("if (true && depth < MAX_DEPTH)"));
        assert!(harvest(false).contains("if (false && depth < MAX_DEPTH)"));
        assert!(harvest(false).starts_with(HARVEST_MARKER));
    }

    #[test]
    fn test_harvest_skips_outbound_links() {
        let script = harvest(false);
        assert!(script.contains("const leavesPage = (el) =>"));
        assert!(script.contains("if (!rendered(el) || leavesPage(el)) continue;"));
    }

    #[test]
    fn test_handle_scripts() {
        assert!(click(7).contains("[7]"));
        assert!(hide(&[1, 4]).contains("[1,4]"));
        assert!(hide(&[]).starts_with(HIDE_MARKER));
    }

    #[test]
    fn test_selector_lists_are_json() {
        let script = overlays(&PATTERNS);
        assert!(script.contains("\"#onetrust-banner-sdk\""));
        let script = frame_hints(&PATTERNS);
        assert!(script.contains("\"iframe[id^='sp_message_iframe']\""));
    }
}
