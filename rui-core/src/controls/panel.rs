//! Toolkit-agnostic model of the control window.
//!
//! The panel owns every control's displayed value and publishes changes
//! through a [`Publish`] implementation. Server pushes arrive on the
//! reception task; the subscriptions registered here only decode the
//! payload and queue a [`DisplayUpdate`]. The UI thread applies queued
//! updates with [`ControlPanel::poll_updates`], which sets displayed
//! values directly and never publishes, so a server-decided value is not
//! echoed back.

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::channels;
use crate::controls::params::{self, SLIDERS, SliderParam};
use crate::demux::{Demuxer, SubscriptionHandle};
use crate::error::RuiError;
use crate::histogram::TileHistogram;
use crate::mux::Publish;
use crate::value::ChannelValue;

/// Device names offered when none are configured.
pub const DEFAULT_DEVICES: [&str; 2] = ["cpu", "ipu"];

// ── DisplayUpdate ────────────────────────────────────────────────

/// A display change queued by the reception task for the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayUpdate {
    /// Set a slider's displayed UI value without publishing.
    Slider { channel: &'static str, value: f32 },
    /// Replace the workload graph.
    Histogram(TileHistogram),
}

// ── Slider ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct Slider {
    param: &'static SliderParam,
    value: f32,
}

impl Slider {
    pub fn channel(&self) -> &'static str {
        self.param.channel
    }

    pub fn label(&self) -> &'static str {
        self.param.label
    }

    /// Displayed UI value.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Value the server receives for the displayed UI value.
    pub fn physical(&self) -> f32 {
        self.param.to_physical(self.value)
    }
}

// ── ModelMenu ────────────────────────────────────────────────────

/// Menu name -> remote model path. An empty menu disables selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelMenu {
    entries: BTreeMap<String, String>,
}

impl ModelMenu {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

// ── ControlPanel ─────────────────────────────────────────────────

pub struct ControlPanel<P: Publish> {
    publisher: P,
    sliders: Vec<Slider>,
    rotation: f32,
    devices: Vec<String>,
    selected_device: usize,
    models: ModelMenu,
    histogram: TileHistogram,
    updates: mpsc::UnboundedReceiver<DisplayUpdate>,
    subscriptions: Vec<SubscriptionHandle>,
}

impl<P: Publish> ControlPanel<P> {
    /// Build the panel, register its inbound subscriptions on `demux`,
    /// then publish every slider's default and the dial's initial angle
    /// so the server starts from known values.
    ///
    /// `demux` must not be running yet.
    pub fn new(publisher: P, demux: &mut Demuxer, devices: Vec<String>, models: ModelMenu) -> Self {
        let (tx, updates) = mpsc::unbounded_channel();
        let mut subscriptions = Vec::new();

        for param in SLIDERS.iter().filter(|p| p.is_server_authoritative()) {
            let tx = tx.clone();
            subscriptions.push(demux.subscribe(param.channel, move |bytes| {
                let inbound = f32::decode(param.channel, bytes)?;
                trace!(channel = param.channel, inbound, "received server value");
                if let Some(value) = param.from_inbound(inbound) {
                    // A closed queue only means the panel is gone.
                    let _ = tx.send(DisplayUpdate::Slider {
                        channel: param.channel,
                        value,
                    });
                }
                Ok(())
            }));
        }

        subscriptions.push(demux.subscribe(channels::TILE_HISTOGRAM, move |bytes| {
            let counts = Vec::<u32>::decode(channels::TILE_HISTOGRAM, bytes)?;
            let _ = tx.send(DisplayUpdate::Histogram(TileHistogram::normalize(&counts)));
            Ok(())
        }));

        let devices = if devices.is_empty() {
            DEFAULT_DEVICES.iter().map(|d| d.to_string()).collect()
        } else {
            devices
        };

        let mut panel = Self {
            publisher,
            sliders: SLIDERS
                .iter()
                .map(|param| Slider {
                    param,
                    value: param.default,
                })
                .collect(),
            rotation: 0.0,
            devices,
            selected_device: 0,
            models,
            histogram: TileHistogram::default(),
            updates,
            subscriptions,
        };

        for i in 0..panel.sliders.len() {
            let slider = panel.sliders[i];
            panel.send_best_effort(slider.channel(), &slider.physical());
        }
        panel.send_best_effort(channels::ENV_ROTATION, &params::rotation_degrees(0.0));
        panel
    }

    fn send_best_effort<T: ChannelValue>(&self, channel: &str, value: &T) {
        if let Err(e) = self.publisher.publish(channel, value.encode()) {
            warn!(channel, "publish failed: {e}");
        }
    }

    // ── Outbound ─────────────────────────────────────────────────

    /// User moved a slider. The value is clamped to `[0, 1]`; returns the
    /// physical value sent.
    pub fn set_slider(&mut self, channel: &str, ui_value: f32) -> Result<f32, RuiError> {
        let slider = self
            .sliders
            .iter_mut()
            .find(|s| s.channel() == channel)
            .ok_or_else(|| RuiError::UnknownControl(channel.to_string()))?;
        slider.value = clamp_unit(ui_value);
        let slider = *slider;

        let physical = slider.physical();
        self.send_best_effort(slider.channel(), &physical);
        Ok(physical)
    }

    /// User turned the rotation dial. Returns the degrees sent.
    pub fn rotate(&mut self, radians: f32) -> f32 {
        self.rotation = params::wrap_angle(radians);
        let degrees = params::rotation_degrees(self.rotation);
        self.send_best_effort(channels::ENV_ROTATION, &degrees);
        degrees
    }

    /// User picked a render device. Sends its display string verbatim.
    pub fn select_device(&mut self, index: usize) -> Result<&str, RuiError> {
        let name = self
            .devices
            .get(index)
            .ok_or_else(|| RuiError::UnknownControl(format!("device #{index}")))?;
        debug!("sending new device: {name}");
        if let Err(e) = self.publisher.publish(channels::DEVICE, name.encode()) {
            warn!("publish failed: {e}");
        }
        self.selected_device = index;
        Ok(&self.devices[index])
    }

    /// User picked a model from the menu. Sends its remote path.
    pub fn select_model(&mut self, name: &str) -> Result<String, RuiError> {
        let path = self
            .models
            .path(name)
            .ok_or_else(|| RuiError::UnknownControl(format!("model '{name}'")))?
            .to_string();
        debug!("loading model '{name}' from {path}");
        self.send_best_effort(channels::LOAD_NIF, &path);
        Ok(path)
    }

    /// Ask the server to shut down. Unlike parameter changes this fails
    /// loudly when the connection is gone.
    pub fn stop(&mut self) -> Result<(), RuiError> {
        self.publisher.publish(channels::STOP, true.encode())
    }

    // ── Inbound ──────────────────────────────────────────────────

    /// Apply every queued server update. Returns how many were applied.
    pub fn poll_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.updates.try_recv() {
            self.apply(update);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, update: DisplayUpdate) {
        match update {
            DisplayUpdate::Slider { channel, value } => {
                if let Some(slider) = self.sliders.iter_mut().find(|s| s.channel() == channel) {
                    slider.value = clamp_unit(value);
                }
            }
            DisplayUpdate::Histogram(histogram) => self.histogram = histogram,
        }
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    pub fn slider(&self, channel: &str) -> Option<&Slider> {
        self.sliders.iter().find(|s| s.channel() == channel)
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    pub fn device_index(&self, name: &str) -> Option<usize> {
        self.devices.iter().position(|d| d == name)
    }

    pub fn selected_device(&self) -> &str {
        &self.devices[self.selected_device]
    }

    pub fn models(&self) -> &ModelMenu {
        &self.models
    }

    pub fn histogram(&self) -> &TileHistogram {
        &self.histogram
    }

    pub fn subscriptions(&self) -> &[SubscriptionHandle] {
        &self.subscriptions
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
