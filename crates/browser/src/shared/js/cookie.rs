/// `arguments[0]` banner id, `arguments[1]` accept button id.
///
/// Returns `"absent"` when no visible banner exists, `"clicked"` when the accept
/// button was pressed and `"hidden"` when the banner had to be torn out.
pub const DISMISS_BANNER: &str = r#"
const banner = document.getElementById(arguments[0]);
if (!banner || !banner.offsetParent) return 'absent';
const accept = document.getElementById(arguments[1]);
if (accept) {
    accept.click();
    return 'clicked';
}
banner.style.display = 'none';
if (banner.parentNode) banner.parentNode.removeChild(banner);
return 'hidden';
"#;

/// `arguments[0]` is a selector list covering the banner and its backdrop.
pub const REMOVE_BANNER: &str = r#"
const nodes = document.querySelectorAll(arguments[0]);
nodes.forEach(el => {
    el.style.display = 'none';
    if (el.parentNode) el.parentNode.removeChild(el);
});
return nodes.length;
"#;
