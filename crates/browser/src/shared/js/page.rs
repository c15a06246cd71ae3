pub const SCROLL_INTO_VIEW: &str = r#"
arguments[0].scrollIntoView({ behavior: 'smooth', block: arguments[1] || 'center' });
return true;
"#;

pub const JS_CLICK: &str = r#"
arguments[0].click();
return true;
"#;

pub const SCROLL_TO_BOTTOM: &str = r#"
window.scrollTo(0, document.body.scrollHeight);
return true;
"#;

pub const SCROLL_BY_VIEWPORT: &str = r#"
window.scrollBy(0, window.innerHeight);
return window.scrollY;
"#;

/// Forces a styled-away file input to be interactable.
pub const REVEAL_FILE_INPUT: &str = r#"
arguments[0].style.opacity = '1';
arguments[0].style.display = 'block';
arguments[0].style.visibility = 'visible';
return true;
"#;

/// `arguments[0]` select element, `arguments[1]` option value.
pub const SELECT_OPTION: &str = r#"
const el = arguments[0];
el.value = arguments[1];
el.dispatchEvent(new Event('input', { bubbles: true }));
el.dispatchEvent(new Event('change', { bubbles: true }));
return el.value === arguments[1];
"#;

pub const DISPATCH_ESCAPE: &str = r#"
const init = {
    key: 'Escape', code: 'Escape', keyCode: 27, which: 27, bubbles: true, cancelable: true,
};
(document.activeElement || document.body).dispatchEvent(new KeyboardEvent('keydown', init));
document.dispatchEvent(new KeyboardEvent('keydown', init));
return true;
"#;
