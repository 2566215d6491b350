//! Page-side scripts.
//!
//! Every element operation re-runs the strategy query in the page and picks
//! the n-th match, so nothing is cached between calls. Scripts return
//! `{ found: false }` when the element is gone.

use fresh_common::error::BackendError;
use fresh_common::protocol::{ElementRef, Strategy};

/// `(strategy, root?)` to the matching elements under `root` (the document by
/// default), in document order.
///
/// Text matches ignore script, style and head content and keep only the
/// innermost candidates, so an ancestor never shadows the element that
/// actually carries the text.
const QUERY_FN: &str = r#"(s, root) => {
  root = root || document;
  switch (s.kind) {
    case 'css':
      return Array.from(root.querySelectorAll(s.selector));
    case 'attribute':
      return Array.from(root.querySelectorAll('*')).filter(e => e.getAttribute(s.name) === s.value);
    case 'text': {
      const skip = 'script, style, head, noscript, template';
      const own = (e) => Array.from(e.childNodes).map(n =>
        n.nodeType === Node.TEXT_NODE ? n.data
          : n.nodeType === Node.ELEMENT_NODE && !n.matches(skip) ? own(n) : ''
      ).join('');
      const t = s.text.toLowerCase();
      const hits = Array.from(root.querySelectorAll(s.tag || '*'))
        .filter(e => !e.closest(skip) && own(e).toLowerCase().includes(t));
      return hits.filter(e => !hits.some(o => o !== e && e.contains(o)));
    }
    default:
      return [];
  }
}"#;

pub const IS_VISIBLE: &str = r#"
  const style = getComputedStyle(el);
  const rect = el.getBoundingClientRect();
  return style.visibility !== 'hidden' && style.display !== 'none' && rect.width > 0 && rect.height > 0;
"#;

/// Returns `ok`, `disabled` or `covered`.
pub const CLICK: &str = r#"
  el.scrollIntoView({ block: 'center', inline: 'center' });
  if (el.disabled) return 'disabled';
  const rect = el.getBoundingClientRect();
  const hit = document.elementFromPoint(rect.left + rect.width / 2, rect.top + rect.height / 2);
  if (hit && hit !== el && !el.contains(hit) && !hit.contains(el)) return 'covered';
  el.click();
  return 'ok';
"#;

pub const CHECK: &str = r#"
  if (el.disabled) return 'disabled';
  if (!el.checked) el.click();
  if (!el.checked) {
    el.checked = true;
    el.dispatchEvent(new Event('change', { bubbles: true }));
  }
  return 'ok';
"#;

pub const FOCUS: &str = "el.focus(); return true;";
pub const READ_TEXT: &str = "return el.textContent;";
pub const INPUT_VALUE: &str = "return el.value === undefined ? '' : String(el.value);";
pub const IS_CHECKED: &str = "return !!el.checked;";
pub const VALIDATION_MESSAGE: &str =
    "return el.validity && !el.validity.valid ? el.validationMessage : null;";

pub const READY_STATE: &str = "document.readyState";
pub const RESOURCE_COUNT: &str = "performance.getEntriesByType('resource').length";
pub const CLEAR_STORAGE: &str = "(() => { localStorage.clear(); return true; })()";

pub fn count(strategy: &Strategy) -> Result<String, BackendError> {
    let strategy = serde_json::to_string(strategy)?;
    Ok(format!("(({query})({strategy})).length", query = QUERY_FN))
}

/// Wrap `body` (which sees the element as `el`) into a self-contained expression.
pub fn on_element(element: &ElementRef, body: &str) -> Result<String, BackendError> {
    let strategy = serde_json::to_string(&element.strategy)?;
    Ok(format!(
        "(() => {{ const el = ({query})({strategy})[{index}]; \
         if (!el) return {{ found: false }}; \
         const value = (() => {{ {body} }})(); \
         return {{ found: true, value: value === undefined ? null : value }}; }})()",
        query = QUERY_FN,
        index = element.index,
    ))
}

/// Text of the first `strategy` match inside `scope`, `null` when the scope
/// holds none. Runs through `on_element`, so a missing scope reports `found: false`.
pub fn text_within(strategy: &Strategy) -> Result<String, BackendError> {
    let strategy = serde_json::to_string(strategy)?;
    Ok(format!(
        "const inner = ({query})({strategy}, el)[0]; \
         return inner ? inner.textContent : null;",
        query = QUERY_FN,
    ))
}

/// Set an input's value through the native setter so frameworks see the change.
pub fn fill(value: &str) -> Result<String, BackendError> {
    let value = serde_json::to_string(value)?;
    Ok(format!(
        "el.focus(); \
         const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
         const setter = Object.getOwnPropertyDescriptor(proto, 'value').set; \
         setter.call(el, {value}); \
         el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
         el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
         return true;"
    ))
}

pub fn read_attribute(name: &str) -> Result<String, BackendError> {
    Ok(format!("return el.getAttribute({});", serde_json::to_string(name)?))
}

pub fn get_storage(key: &str) -> Result<String, BackendError> {
    Ok(format!("localStorage.getItem({})", serde_json::to_string(key)?))
}

pub fn set_storage(key: &str, value: &str) -> Result<String, BackendError> {
    Ok(format!(
        "(() => {{ localStorage.setItem({}, {}); return true; }})()",
        serde_json::to_string(key)?,
        serde_json::to_string(value)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_is_embedded_as_json() {
        let script = count(&Strategy::css("button[type=\"submit\"]")).unwrap();
        assert!(script.contains(r#"{"kind":"css","selector":"button[type=\"submit\"]"}"#));
        assert!(script.ends_with(".length"));
    }

    #[test]
    fn element_index_is_applied() {
        let el = ElementRef {
            strategy: Strategy::text("a", "Sign up"),
            index: 2,
        };
        let script = on_element(&el, READ_TEXT).unwrap();
        assert!(script.contains(")[2];"));
        assert!(script.contains("return el.textContent;"));
    }

    #[test]
    fn scoped_reads_query_under_the_scope() {
        let body = text_within(&Strategy::css(".food-item")).unwrap();
        assert!(body.contains(r#"({"kind":"css","selector":".food-item"}, el)[0]"#));
        assert!(body.contains("return inner ? inner.textContent : null;"));
    }

    #[test]
    fn text_queries_skip_non_rendered_content() {
        let script = count(&Strategy::text("*", "not found")).unwrap();
        assert!(script.contains("script, style, head"));
        assert!(script.contains("e.contains(o)"));
    }

    #[test]
    fn storage_values_are_quoted() {
        let script = set_storage("currentUser", r#"{"name":"O'Brien"}"#).unwrap();
        assert!(script.contains(r#""{\"name\":\"O'Brien\"}""#));
    }
}
