//! Cable drag state machine.
//!
//! The machine never touches the rack. It reads port occupancy through
//! [`PortOccupancy`] and answers each [`DragEvent`] with the [`WireAction`]s
//! the caller must apply, in order, before feeding the next event.
//!
//! ```text
//! Idle ──press port──▶ Dragging ──release on opposite polarity──▶ Connected
//!   ▲                     │
//!   └──release elsewhere / same polarity / cancel
//! ```
//!
//! Pressing an Input that already has a wire picks that wire up: it is
//! detached and the drag continues from the wire's source Output. Releasing
//! on an occupied Input detaches the wire already there before connecting.

use rackwire_core::{InputRef, OutputRef, Rack, WireId};

/// A port a cable end can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortRef {
    /// A module output.
    Output(OutputRef),
    /// A module input.
    Input(InputRef),
}

/// Pointer events from the cable UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEvent {
    /// Button pressed over a port.
    Press(PortRef),
    /// Button released, over a port or over empty space.
    Release(Option<PortRef>),
    /// Drag abandoned (escape key, focus loss).
    Cancel,
}

/// A graph change the caller applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireAction {
    /// Remove this wire.
    Detach(WireId),
    /// Register a wire from `output` to `input`.
    Connect {
        /// Source.
        output: OutputRef,
        /// Destination.
        input: InputRef,
    },
}

/// Where the machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No cable in hand.
    #[default]
    Idle,
    /// A half-wire follows the pointer.
    Dragging {
        /// The bound end.
        anchor: PortRef,
        /// Wire lifted off an input by the press, if any.
        picked_up: Option<WireId>,
    },
    /// The last drag produced this wire.
    Connected {
        /// The registered wire.
        wire: WireId,
    },
}

/// Read access to the wire set, as the machine needs it.
pub trait PortOccupancy {
    /// The wire feeding `input` and its source, if any.
    fn wire_at_input(&self, input: InputRef) -> Option<(WireId, OutputRef)>;
}

impl PortOccupancy for Rack {
    fn wire_at_input(&self, input: InputRef) -> Option<(WireId, OutputRef)> {
        let id = Rack::wire_at_input(self, input)?;
        self.wire(id).map(|w| (id, w.output))
    }
}

/// Cable drag state machine.
#[derive(Debug, Clone, Default)]
pub struct ConnectionFsm {
    state: ConnectionState,
}

impl ConnectionFsm {
    /// Creates an idle machine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True while a half-wire is in hand.
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, ConnectionState::Dragging { .. })
    }

    /// Advances on one event and returns the actions to apply.
    ///
    /// A release that yields a [`WireAction::Connect`] leaves the machine
    /// idle until the caller reports the new wire through
    /// [`connected`](Self::connected).
    pub fn handle(&mut self, event: DragEvent, ports: &impl PortOccupancy) -> Vec<WireAction> {
        match event {
            DragEvent::Press(port) => self.press(port, ports),
            DragEvent::Release(target) => self.release(target, ports),
            DragEvent::Cancel => {
                self.state = ConnectionState::Idle;
                Vec::new()
            }
        }
    }

    /// Records the wire registered for the last `Connect` action.
    pub fn connected(&mut self, wire: WireId) {
        self.state = ConnectionState::Connected { wire };
    }

    fn press(&mut self, port: PortRef, ports: &impl PortOccupancy) -> Vec<WireAction> {
        match port {
            PortRef::Input(input) => match ports.wire_at_input(input) {
                Some((wire, source)) => {
                    self.state = ConnectionState::Dragging {
                        anchor: PortRef::Output(source),
                        picked_up: Some(wire),
                    };
                    vec![WireAction::Detach(wire)]
                }
                None => {
                    self.state = ConnectionState::Dragging {
                        anchor: port,
                        picked_up: None,
                    };
                    Vec::new()
                }
            },
            PortRef::Output(_) => {
                self.state = ConnectionState::Dragging {
                    anchor: port,
                    picked_up: None,
                };
                Vec::new()
            }
        }
    }

    fn release(&mut self, target: Option<PortRef>, ports: &impl PortOccupancy) -> Vec<WireAction> {
        let ConnectionState::Dragging { anchor, .. } = self.state else {
            return Vec::new();
        };
        self.state = ConnectionState::Idle;

        let (output, input) = match (anchor, target) {
            (PortRef::Output(o), Some(PortRef::Input(i))) | (PortRef::Input(i), Some(PortRef::Output(o))) => {
                (o, i)
            }
            _ => return Vec::new(),
        };

        let mut actions = Vec::with_capacity(2);
        if let Some((existing, _)) = ports.wire_at_input(input) {
            actions.push(WireAction::Detach(existing));
        }
        actions.push(WireAction::Connect { output, input });
        actions
    }
}
