mod html5ever_engine;

use anyhow::Error;

use crate::dom::{DOM, NodeId};
use html5ever_engine::{Html5everEngine, find_template, import_children, template_body};

impl DOM {
    /// Parse a full HTML document.
    ///
    /// # Errors
    /// Returns an error if the input cannot be read or imported.
    pub fn parse(html: &str) -> Result<Self, Error> {
        let rc_dom = Html5everEngine::new().parse(html)?;
        let mut dom = Self::new();
        let root = dom.root();
        import_children(&mut dom, &rc_dom.document, root)?;
        Ok(dom)
    }

    /// Parse markup in body context into a detached fragment owned by this
    /// document. Text-only and whitespace-only markup yield text children.
    ///
    /// # Errors
    /// Returns an error if the input cannot be read or imported.
    pub fn parse_fragment(&mut self, html: &str) -> Result<NodeId, Error> {
        let fragment = self.create_fragment();
        if html.is_empty() {
            return Ok(fragment);
        }
        // Template content accepts any flow/table markup without reparenting.
        let wrapped = format!("<template>{html}</template>");
        let rc_dom = Html5everEngine::new().parse(&wrapped)?;
        if let Some(template) = find_template(&rc_dom.document) {
            import_children(self, &template_body(&template), fragment)?;
        }
        Ok(fragment)
    }
}
