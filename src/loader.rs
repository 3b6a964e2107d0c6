//! Background photo decoding.
//!
//! Requests are decoded on the rayon thread pool and handed back over a
//! channel. Nothing is ever cancelled: every outcome comes back tagged with
//! its [`LoadTicket`], and the mount table decides whether it still applies.

use crate::error::TextureError;
use crate::mount::{LoadRequest, LoadTicket};
use crate::textures::PhotoImage;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Result of one finished load.
#[derive(Debug)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub reference: String,
    pub result: Result<Arc<PhotoImage>, TextureError>,
}

/// Decodes photo references off the render thread.
#[derive(Debug)]
pub struct ImageLoader {
    sender: Sender<LoadOutcome>,
    receiver: Receiver<LoadOutcome>,
    in_flight: usize,
}

impl ImageLoader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Start decoding `request.reference` in the background.
    pub fn request(&mut self, request: LoadRequest) {
        let sender = self.sender.clone();
        self.in_flight += 1;
        rayon::spawn(move || {
            let result = PhotoImage::load(&request.reference).map(Arc::new);
            // The loader may have been dropped with the scene; nobody is
            // waiting for this result then.
            let _ = sender.send(LoadOutcome {
                ticket: request.ticket,
                reference: request.reference,
                result,
            });
        });
    }

    /// Collect every outcome that has arrived, without blocking.
    pub fn poll(&mut self) -> Vec<LoadOutcome> {
        let outcomes: Vec<LoadOutcome> = self.receiver.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(outcomes.len());
        outcomes
    }

    /// Requests started but not yet collected by [`poll`](Self::poll).
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}
