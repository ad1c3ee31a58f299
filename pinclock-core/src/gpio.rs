//! Button edge pipeline: interrupt producer and dispatch task

use crate::hal::{EdgeInput, OutputLevel};
use crate::queue::{EventQueue, EventSource, PushOutcome};
use crate::types::{GpioEdgeEvent, OutputState, PinAction, PinMap};

/// Interrupt-side half of the GPIO pipeline
///
/// Constant time, no blocking and no logging. A full queue drops the edge.
pub struct GpioEdgeProducer<'a, const N: usize> {
    queue: &'a EventQueue<GpioEdgeEvent, N>,
}

impl<'a, const N: usize> GpioEdgeProducer<'a, N> {
    pub const fn new(queue: &'a EventQueue<GpioEdgeEvent, N>) -> Self {
        Self { queue }
    }

    /// Called from the GPIO interrupt handler with the triggering pin
    pub fn on_edge(&self, pin: u8) -> PushOutcome {
        self.queue.push_from_isr(GpioEdgeEvent::new(pin))
    }
}

/// The three monitored inputs paired with their pin numbers
///
/// Inputs are handed over idle. Call [`EdgeInputs::listen_all`] only once
/// the bank is reachable from the interrupt handler, so every latched edge
/// finds someone to acknowledge it.
pub struct EdgeInputs<'a, I, const N: usize> {
    inputs: [(u8, I); 3],
    producer: GpioEdgeProducer<'a, N>,
}

impl<'a, I, const N: usize> EdgeInputs<'a, I, N>
where
    I: EdgeInput,
{
    /// Pair `inputs` with `pins` in on, off, toggle order
    pub fn new(pins: PinMap, inputs: [I; 3], producer: GpioEdgeProducer<'a, N>) -> Self {
        let [on, off, toggle] = inputs;
        Self {
            inputs: [(pins.on, on), (pins.off, off), (pins.toggle, toggle)],
            producer,
        }
    }

    /// Start latching edges on every input
    pub fn listen_all(&mut self) {
        for (_, input) in self.inputs.iter_mut() {
            input.listen();
        }
    }

    /// Interrupt body: acknowledge each pending input and forward its pin
    ///
    /// Returns how many edges were serviced, dropped ones included.
    pub fn service(&mut self) -> usize {
        let mut serviced = 0;
        for (pin, input) in self.inputs.iter_mut() {
            if input.is_pending() {
                input.acknowledge();
                self.producer.on_edge(*pin);
                serviced += 1;
            }
        }
        serviced
    }
}

/// What the dispatcher did with one edge event
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchOutcome {
    /// The pin is mapped; output now reflects `state`
    Applied {
        pin: u8,
        action: PinAction,
        state: OutputState,
    },
    /// The pin is not in the action table
    Ignored { pin: u8 },
}

/// Task-side half of the GPIO pipeline
///
/// Sole owner of [`OutputState`] and of the output pin.
pub struct GpioDispatcher<O> {
    pins: PinMap,
    state: OutputState,
    output: O,
}

impl<O> GpioDispatcher<O>
where
    O: OutputLevel,
{
    /// Create a dispatcher; the output is assumed to start low
    pub fn new(pins: PinMap, output: O) -> Self {
        Self {
            pins,
            state: OutputState::OFF,
            output,
        }
    }

    pub fn state(&self) -> OutputState {
        self.state
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn pins(&self) -> &PinMap {
        &self.pins
    }

    /// Consume the dispatcher and hand back the output
    pub fn into_output(self) -> O {
        self.output
    }

    /// Apply the action table to one event and drive the output
    ///
    /// On a failed write the recorded state keeps its previous value.
    pub fn dispatch(&mut self, event: GpioEdgeEvent) -> Result<DispatchOutcome, O::Error> {
        let Some(action) = self.pins.action(event.pin) else {
            return Ok(DispatchOutcome::Ignored { pin: event.pin });
        };

        let next = self.state.apply(action);
        self.output.set_level(next.level())?;
        self.state = next;

        Ok(DispatchOutcome::Applied {
            pin: event.pin,
            action,
            state: next,
        })
    }

    /// Wait for one event and process it
    ///
    /// Returns `None` if the source timed out.
    pub async fn step<S>(&mut self, source: &mut S) -> Option<Result<DispatchOutcome, O::Error>>
    where
        S: EventSource<GpioEdgeEvent>,
    {
        let event = source.next_event().await?;
        let result = self.dispatch(event);

        #[cfg(feature = "defmt")]
        match &result {
            Ok(DispatchOutcome::Applied { pin, action, state }) => {
                defmt::debug!("🔘 pin {} -> {:?}, output {}", pin, action, state.as_int());
            }
            Ok(DispatchOutcome::Ignored { pin }) => defmt::trace!("pin {} not mapped", pin),
            Err(_) => defmt::error!("output write failed for pin {}", event.pin),
        }

        Some(result)
    }

    /// Dispatch loop; never returns
    pub async fn run<S>(mut self, mut source: S) -> !
    where
        S: EventSource<GpioEdgeEvent>,
    {
        loop {
            let _ = self.step(&mut source).await;
        }
    }
}
