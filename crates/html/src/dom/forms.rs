//! Form-control state and form-data collection.
//!
//! Attribute values are the defaults; live state set through `set_value` or
//! `set_checked` overrides them until the owning form is reset.

use super::{DOM, NodeId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlState {
    pub(crate) value: Option<String>,
    pub(crate) checked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    /// A file input entry. Only the file name is tracked.
    File { file_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEntry {
    pub name: String,
    pub value: FormValue,
}

const BUTTON_INPUT_TYPES: [&str; 4] = ["submit", "button", "reset", "image"];

impl DOM {
    fn input_type(&self, id: NodeId) -> String {
        self.attr(id, "type")
            .map_or_else(|| "text".to_owned(), str::to_ascii_lowercase)
    }

    fn is_checkable(&self, id: NodeId) -> bool {
        self.tag(id) == Some("input") && matches!(self.input_type(id).as_str(), "checkbox" | "radio")
    }

    /// Current value of an input, textarea, select or button.
    pub fn value(&self, id: NodeId) -> String {
        if let Some(value) = self.node(id).and_then(|node| node.control.value.clone()) {
            return value;
        }
        match self.tag(id) {
            Some("textarea") => self.text_content(id),
            Some("select") => self.selected_option_value(id).unwrap_or_default(),
            Some("option") => self
                .attr(id, "value")
                .map_or_else(|| self.text_content(id), str::to_owned),
            Some("input") if self.is_checkable(id) => self.attr(id, "value").unwrap_or("on").to_owned(),
            _ => self.attr(id, "value").unwrap_or_default().to_owned(),
        }
    }

    /// Set the live value, leaving the default untouched.
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        if let Some(node) = self.node_mut(id) {
            node.control.value = Some(value.to_owned());
        }
    }

    /// Set the default value (the `value` attribute, or the text of a textarea).
    pub fn set_default_value(&mut self, id: NodeId, value: &str) {
        if self.tag(id) == Some("textarea") {
            self.set_text_content(id, value);
        } else {
            self.set_attr(id, "value", value);
        }
    }

    pub fn checked(&self, id: NodeId) -> bool {
        self.node(id)
            .and_then(|node| node.control.checked)
            .unwrap_or_else(|| self.has_attr(id, "checked"))
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        if let Some(node) = self.node_mut(id) {
            node.control.checked = Some(checked);
        }
    }

    /// Value of the selected option (or the first option) of a `<select>`.
    fn selected_option_value(&self, select: NodeId) -> Option<String> {
        let options: Vec<NodeId> = self
            .descendant_elements(select)
            .into_iter()
            .filter(|node| self.tag(*node) == Some("option"))
            .collect();
        let chosen = options
            .iter()
            .copied()
            .find(|option| self.has_attr(*option, "selected"))
            .or_else(|| options.first().copied())?;
        Some(self.value(chosen))
    }

    /// Restore every control owned by `form` to its default value and checkedness.
    pub fn reset(&mut self, form: NodeId) {
        let root = self.root();
        let owned: Vec<NodeId> = self
            .descendant_elements(root)
            .into_iter()
            .filter(|control| self.form_owner(*control) == Some(form))
            .collect();
        for control in owned {
            if let Some(node) = self.node_mut(control) {
                node.control = ControlState::default();
            }
        }
    }

    /// The form a control belongs to: its `form` attribute, else the nearest
    /// ancestor form.
    pub fn form_owner(&self, control: NodeId) -> Option<NodeId> {
        if let Some(form_id) = self.attr(control, "form") {
            return self
                .get_element_by_id(form_id)
                .filter(|form| self.tag(*form) == Some("form"));
        }
        self.closest_where(control, |dom, node| dom.tag(node) == Some("form"))
    }

    /// `input[type=submit]` or a `<button>` whose type is absent or `submit`.
    pub fn is_submit_control(&self, id: NodeId) -> bool {
        match self.tag(id) {
            Some("button") => self
                .attr(id, "type")
                .is_none_or(|kind| kind.eq_ignore_ascii_case("submit")),
            Some("input") => self.input_type(id) == "submit",
            _ => false,
        }
    }

    fn is_disabled(&self, control: NodeId) -> bool {
        self.has_attr(control, "disabled")
            || self
                .ancestor_elements(control)
                .skip(1)
                .any(|node| self.tag(node) == Some("fieldset") && self.has_attr(node, "disabled"))
    }

    /// Collect the form data set of `form` in tree order, including controls
    /// outside it that name it through a `form` attribute.
    ///
    /// Disabled and unnamed controls are skipped, as are buttons: the submitter
    /// is appended by the caller.
    pub fn form_data(&self, form: NodeId) -> Vec<FormEntry> {
        let mut entries = Vec::new();
        let root = self.root();
        for control in self.descendant_elements(root) {
            let Some(tag) = self.tag(control) else {
                continue;
            };
            if !matches!(tag, "input" | "select" | "textarea") {
                continue;
            }
            let Some(name) = self.attr(control, "name").filter(|name| !name.is_empty()) else {
                continue;
            };
            if self.is_disabled(control) || self.form_owner(control) != Some(form) {
                continue;
            }
            let name = name.to_owned();
            if tag == "input" {
                let kind = self.input_type(control);
                if BUTTON_INPUT_TYPES.contains(&kind.as_str()) {
                    continue;
                }
                if self.is_checkable(control) && !self.checked(control) {
                    continue;
                }
                if kind == "file" {
                    entries.push(FormEntry {
                        name,
                        value: FormValue::File {
                            file_name: self.value(control),
                        },
                    });
                    continue;
                }
            }
            entries.push(FormEntry {
                name,
                value: FormValue::Text(self.value(control)),
            });
        }
        entries
    }
}
