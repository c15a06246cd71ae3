/// Wraps an element-bound function so a detached node fails loudly instead of
/// silently reporting stale geometry.
pub fn guarded(body: &str) -> String {
    format!(
        r#"function(...args) {{
    if (this && this.nodeType && !this.isConnected) throw new Error('stale element reference');
    return (function() {{
{}
    }}).apply(this, args);
}}"#,
        body
    )
}

pub const FIND_ALL: &str = r#"
const [strategy, selector] = arguments;
const root = (this && this.nodeType) ? this : document;
const esc = (s) => (window.CSS && CSS.escape) ? CSS.escape(s) : s.replace(/["\\]/g, '\\$&');
switch (strategy) {
    case 'id':
        return Array.from(root.querySelectorAll('#' + esc(selector)));
    case 'name':
        return Array.from(root.querySelectorAll('[name="' + esc(selector) + '"]'));
    case 'css':
        return Array.from(root.querySelectorAll(selector));
    case 'xpath': {
        const doc = root.ownerDocument || root;
        const snap = doc.evaluate(
            selector, root, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
        const out = [];
        for (let i = 0; i < snap.snapshotLength; i++) out.push(snap.snapshotItem(i));
        return out;
    }
    default:
        throw new Error('unknown locator strategy: ' + strategy);
}
"#;

pub const CHECK_ELEMENT_STATE: &str = r#"
const el = this;
const rect = el.getBoundingClientRect();
const style = window.getComputedStyle(el);
const visible = rect.width > 0 && rect.height > 0 &&
    style.visibility !== 'hidden' && style.display !== 'none' && style.opacity !== '0';
return {
    visible,
    disabled: !!el.disabled || el.getAttribute('aria-disabled') === 'true',
};
"#;

pub const ELEMENT_RECT: &str = r#"
const r = this.getBoundingClientRect();
const style = window.getComputedStyle(this);
return {
    x: r.left, y: r.top, width: r.width, height: r.height,
    borderLeft: parseFloat(style.borderLeftWidth) || 0,
    borderTop: parseFloat(style.borderTopWidth) || 0,
};
"#;

pub const SCROLL_TO_CENTER: &str = r#"
this.scrollIntoView({ block: 'center', inline: 'center' });
return true;
"#;

pub const READ_TEXT: &str = r#"
return (this.innerText !== undefined ? this.innerText : this.textContent || '').trim();
"#;

pub const READ_ATTRIBUTE: &str = r#"
return this.getAttribute(arguments[0]);
"#;

pub const READ_VALUE: &str = r#"
return this.value === undefined || this.value === null ? '' : String(this.value);
"#;

pub const FOCUS: &str = r#"
this.focus();
return document.activeElement === this || this.contains(document.activeElement);
"#;

pub const CLEAR_VALUE: &str = r#"
this.focus();
if ('value' in this) {
    this.value = '';
    this.dispatchEvent(new Event('input', { bubbles: true }));
    this.dispatchEvent(new Event('change', { bubbles: true }));
}
return true;
"#;

pub const DISPATCH_INPUT: &str = r#"
this.dispatchEvent(new Event('input', { bubbles: true }));
this.dispatchEvent(new Event('change', { bubbles: true }));
return true;
"#;
