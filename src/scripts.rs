//! Builders for the JavaScript probes injected into the page.
//!
//! All user-facing strings (labels, placeholders, credentials) are embedded
//! as JSON literals so quotes and non-ASCII glyphs like the masked-password
//! placeholder survive intact.

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Check whether a clickable element with the given accessible label is
/// currently visible. Returns `{ found: bool }`.
pub fn probe_button(label: &str) -> String {
    format!(
        r#"
        (function probeButton() {{
            const label = {label};
            const candidates = Array.from(document.querySelectorAll(
                "button, [role='button'], input[type='submit'], input[type='button']"
            ));
            const visible = candidates.find(el => {{
                const text = (el.textContent || el.value || '').trim();
                if (text !== label) return false;
                const rect = el.getBoundingClientRect();
                const style = window.getComputedStyle(el);
                return rect.width > 0 && rect.height > 0 &&
                    style.visibility !== 'hidden' && style.display !== 'none';
            }});
            return {{ found: !!visible }};
        }})()
        "#,
        label = js_string(label)
    )
}

/// Look the element up fresh and click it. Returns `{ success: bool }`.
pub fn click_button(label: &str) -> String {
    format!(
        r#"
        (function clickButton() {{
            const label = {label};
            const candidates = Array.from(document.querySelectorAll(
                "button, [role='button'], input[type='submit'], input[type='button']"
            ));
            const target = candidates.find(el => {{
                const text = (el.textContent || el.value || '').trim();
                if (text !== label) return false;
                const rect = el.getBoundingClientRect();
                const style = window.getComputedStyle(el);
                return rect.width > 0 && rect.height > 0 &&
                    style.visibility !== 'hidden' && style.display !== 'none';
            }});
            if (!target) return {{ success: false, error: 'not found' }};

            target.scrollIntoView({{ block: 'center' }});
            target.focus();
            target.click();

            const rect = target.getBoundingClientRect();
            const centerX = rect.left + rect.width / 2;
            const centerY = rect.top + rect.height / 2;
            ['mousedown', 'mouseup', 'click'].forEach(type => {{
                target.dispatchEvent(new MouseEvent(type, {{
                    bubbles: true,
                    cancelable: true,
                    clientX: centerX,
                    clientY: centerY
                }}));
            }});

            return {{ success: true }};
        }})()
        "#,
        label = js_string(label)
    )
}

/// Fill an input located by its exact placeholder text and fire the events a
/// framework-rendered form listens for. Returns `{ success: bool }`.
pub fn fill_by_placeholder(placeholder: &str, value: &str) -> String {
    format!(
        r#"
        (function fillByPlaceholder() {{
            const placeholder = {placeholder};
            const value = {value};
            const field = Array.from(document.querySelectorAll('input, textarea'))
                .find(el => el.getAttribute('placeholder') === placeholder);
            if (!field) return {{ success: false, error: 'not found' }};

            field.focus();
            field.value = value;
            ['input', 'change'].forEach(type => {{
                field.dispatchEvent(new Event(type, {{ bubbles: true, cancelable: true }}));
            }});

            return {{ success: true }};
        }})()
        "#,
        placeholder = js_string(placeholder),
        value = js_string(value)
    )
}

/// Check whether the page's rendered text contains a fragment.
/// Returns `{ visible: bool }`.
pub fn probe_text(fragment: &str) -> String {
    format!(
        r#"
        (function probeText() {{
            const fragment = {fragment};
            const body = document.body;
            return {{ visible: !!body && (body.innerText || '').includes(fragment) }};
        }})()
        "#,
        fragment = js_string(fragment)
    )
}
