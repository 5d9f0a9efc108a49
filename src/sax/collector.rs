//! Event Collector
//!
//! Implements ContentHandler to record a replay as a list of owned events.

use super::attributes::Attributes;
use super::events::SaxEvent;
use super::handler::{ContentHandler, HandlerResult};
use crate::buffer::Opaque;

/// Consumer that records every event it receives
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<SaxEvent>,
}

impl EventCollector {
    /// Create a new collector
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(256),
        }
    }

    /// Create with estimated capacity
    pub fn with_capacity(events: usize) -> Self {
        Self {
            events: Vec::with_capacity(events),
        }
    }

    /// Take the collected events
    pub fn take_events(&mut self) -> Vec<SaxEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get the collected events as a slice
    pub fn events(&self) -> &[SaxEvent] {
        &self.events
    }

    /// Get number of collected events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

impl ContentHandler for EventCollector {
    fn start_document(&mut self) -> HandlerResult {
        self.events.push(SaxEvent::StartDocument);
        Ok(())
    }

    fn end_document(&mut self) -> HandlerResult {
        self.events.push(SaxEvent::EndDocument);
        Ok(())
    }

    fn start_element(
        &mut self,
        uri: &str,
        local_name: &str,
        qname: &str,
        attributes: &Attributes,
    ) -> HandlerResult {
        self.events.push(SaxEvent::StartElement {
            uri: uri.to_string(),
            local_name: local_name.to_string(),
            qname: qname.to_string(),
            attributes: attributes.to_vec(),
        });
        Ok(())
    }

    fn end_element(&mut self, uri: &str, local_name: &str, qname: &str) -> HandlerResult {
        self.events
            .push(SaxEvent::end_element(uri, local_name, qname));
        Ok(())
    }

    fn characters(&mut self, text: &str) -> HandlerResult {
        self.events.push(SaxEvent::Characters(text.to_string()));
        Ok(())
    }

    fn comment(&mut self, text: &str) -> HandlerResult {
        self.events.push(SaxEvent::Comment(text.to_string()));
        Ok(())
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> HandlerResult {
        self.events.push(SaxEvent::ProcessingInstruction {
            target: target.to_string(),
            data: data.to_string(),
        });
        Ok(())
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> HandlerResult {
        self.events
            .push(SaxEvent::start_prefix_mapping(prefix, uri));
        Ok(())
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> HandlerResult {
        self.events.push(SaxEvent::end_prefix_mapping(prefix));
        Ok(())
    }

    fn object_content(&mut self, value: &Opaque) -> HandlerResult {
        self.events.push(SaxEvent::Object(value.clone()));
        Ok(())
    }
}
