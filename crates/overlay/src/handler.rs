use log::{error, warn};

use crate::engine::OverlayEngine;
use crate::protocol::{Adjustment, Request, Response};

/// The boundary the transport talks to. Every failure becomes an error response;
/// nothing propagates past `handle`.
pub trait RequestHandler {
    fn handle(&mut self, request: Request) -> Response;
}

impl RequestHandler for OverlayEngine {
    fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::GetStyles => Response::Status(self.status()),
            Request::UpdateStyles {
                font_size,
                line_height,
                letter_spacing,
                pangu,
            } => {
                let adjustment = match Adjustment::from_inputs(
                    font_size.as_ref(),
                    line_height.as_ref(),
                    letter_spacing.as_ref(),
                    pangu,
                ) {
                    Ok(adjustment) => adjustment,
                    Err(err) => {
                        warn!("updateStyles rejected: {err}");
                        return Response::error(err.to_string());
                    }
                };
                match self.set_adjustment(adjustment) {
                    Ok(()) => Response::success(),
                    Err(err) => {
                        error!("updateStyles failed: {err:#}");
                        Response::error(format!("{err:#}"))
                    }
                }
            }
        }
    }
}
