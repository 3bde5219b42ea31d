use anyhow::Error;
use html5ever::tendril::TendrilSink as _;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use smallvec::SmallVec;

use crate::dom::{DOM, DOMNode, NodeId, NodeKind};

/// html5ever front end building into an `RcDom`, then copied into the arena.
pub struct Html5everEngine {
    opts: ParseOpts,
}

impl Default for Html5everEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Html5everEngine {
    pub fn new() -> Self {
        Self {
            opts: ParseOpts {
                tree_builder: TreeBuilderOpts {
                    exact_errors: false,
                    scripting_enabled: false,
                    ..TreeBuilderOpts::default()
                },
                ..ParseOpts::default()
            },
        }
    }

    /// Run the tree builder over a complete document.
    ///
    /// # Errors
    /// Returns an error if the input cannot be read.
    pub fn parse(&self, html: &str) -> Result<RcDom, Error> {
        let rc_dom = parse_document(RcDom::default(), self.opts.clone())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;
        log::trace!("parsed {} bytes of markup", html.len());
        Ok(rc_dom)
    }
}

/// Copy the children of `handle` under `parent` in the arena.
pub fn import_children(dom: &mut DOM, handle: &Handle, parent: NodeId) -> Result<(), Error> {
    for child in handle.children.borrow().iter() {
        import_node(dom, child, parent)?;
    }
    Ok(())
}

fn import_node(dom: &mut DOM, handle: &Handle, parent: NodeId) -> Result<(), Error> {
    match &handle.data {
        NodeData::Document => import_children(dom, handle, parent),
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let attrs: SmallVec<(String, String), 4> = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            let id = dom.create_node(DOMNode {
                kind: NodeKind::Element {
                    tag: name.local.to_string(),
                },
                attrs,
                ..DOMNode::default()
            });
            dom.append_child(parent, id)?;
            // Template contents live off-tree in html5ever; inline them.
            if let Some(contents) = template_contents.borrow().as_ref() {
                import_children(dom, contents, id)?;
            }
            import_children(dom, handle, id)
        }
        NodeData::Text { contents } => {
            let id = dom.create_text(&contents.borrow());
            dom.append_child(parent, id)
        }
        NodeData::Comment { contents } => {
            let id = dom.create_node(DOMNode {
                kind: NodeKind::Comment {
                    text: contents.to_string(),
                },
                ..DOMNode::default()
            });
            dom.append_child(parent, id)
        }
        NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => Ok(()),
    }
}

/// The first `<template>` element in document order.
pub fn find_template(handle: &Handle) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &handle.data {
        if &*name.local == "template" {
            return Some(Handle::clone(handle));
        }
    }
    handle.children.borrow().iter().find_map(find_template)
}

/// Template contents if html5ever produced them, else the element itself.
pub fn template_body(template: &Handle) -> Handle {
    if let NodeData::Element {
        template_contents, ..
    } = &template.data
    {
        if let Some(contents) = template_contents.borrow().as_ref() {
            return Handle::clone(contents);
        }
    }
    Handle::clone(template)
}
