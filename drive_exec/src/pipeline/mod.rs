//! # Drive pipeline module
//!
//! A drive pipeline turns data from some source (a motion profile, a network
//! command) into motor demands by passing it through a chain of stages. There
//! are three kinds of stage:
//!
//! - An [`Input`] produces a fresh value each tick, usually by reading
//!   sensors or looking up a profile point.
//! - A [`Processor`] transforms the value, for example by adding
//!   feed-forward terms or closing a heading loop. Processors may carry
//!   internal state (integral accumulators) but must not otherwise depend on
//!   invocation order.
//! - An [`Output`] consumes the final value and commands the actuators.
//!
//! Stages are chained with the combinators on the traits: `input.then(proc)`
//! is itself an `Input`, `output.after(proc)` is itself an `Output`, and
//! `input.feed(output)` is an [`Executable`] which runs one whole tick when
//! called. The external cyclic executive calls the executable once per tick;
//! no stage caches data between ticks except processors which intentionally
//! accumulate.
//!
//! Plain closures can be used anywhere a stage is expected: `FnMut() -> T`
//! is an `Input`, `FnMut(I) -> O` is a `Processor` and `FnMut(T)` is an
//! `Output`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod data;
pub mod feed_forward;
pub mod output;
pub mod pid;
pub mod profile_input;
pub mod transform;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use data::*;
pub use feed_forward::*;
pub use output::*;
pub use pid::*;
pub use profile_input::*;
pub use transform::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A pipeline stage producing one value per tick.
pub trait Input {
    /// The type of value produced.
    type Output;

    /// Produce this tick's value.
    fn get(&mut self) -> Self::Output;

    /// Chain a processor onto this input, giving a new `Input` which
    /// produces the processed value.
    fn then<P>(self, processor: P) -> Then<Self, P>
    where
        Self: Sized,
        P: Processor<Self::Output>
    {
        Then {
            input: self,
            processor
        }
    }

    /// Chain an output onto this input, giving an [`Executable`] which
    /// performs a full tick (produce then consume) when run.
    fn feed<O>(self, output: O) -> Feed<Self, O>
    where
        Self: Sized,
        O: Output<Self::Output>
    {
        Feed {
            input: self,
            output
        }
    }
}

/// A pipeline stage transforming a value.
pub trait Processor<I> {
    /// The type of value produced.
    type Output;

    /// Transform this tick's value.
    ///
    /// Takes `&mut self` since processors may carry accumulator state.
    fn apply(&mut self, input: I) -> Self::Output;
}

/// A pipeline stage consuming the final value and acting on the outside
/// world.
pub trait Output<T> {
    /// Consume this tick's value.
    fn accept(&mut self, value: T);

    /// Chain a processor in front of this output, giving a new `Output`
    /// which processes the value before consuming it.
    fn after<I, P>(self, processor: P) -> After<P, Self>
    where
        Self: Sized,
        P: Processor<I, Output = T>
    {
        After {
            processor,
            output: self
        }
    }
}

/// A zero-argument action, run once per tick by the cyclic executive.
pub trait Executable {
    /// Perform the required action.
    fn execute(&mut self);
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An [`Input`] which feeds another input's value through a processor. Built
/// with [`Input::then`].
pub struct Then<I, P> {
    /// The upstream input.
    pub input: I,

    /// The processor applied to the input's value.
    pub processor: P
}

/// An [`Output`] which feeds values through a processor before another
/// output. Built with [`Output::after`].
pub struct After<P, O> {
    /// The processor applied to incoming values.
    pub processor: P,

    /// The downstream output.
    pub output: O
}

/// An [`Executable`] running a complete input-to-output tick. Built with
/// [`Input::feed`].
pub struct Feed<I, O> {
    /// The input producing each tick's value.
    pub input: I,

    /// The output consuming each tick's value.
    pub output: O
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<I, P> Input for Then<I, P>
where
    I: Input,
    P: Processor<I::Output>
{
    type Output = P::Output;

    fn get(&mut self) -> Self::Output {
        self.processor.apply(self.input.get())
    }
}

impl<I, P, O> Output<I> for After<P, O>
where
    P: Processor<I>,
    O: Output<P::Output>
{
    fn accept(&mut self, value: I) {
        self.output.accept(self.processor.apply(value))
    }
}

impl<I, O> Executable for Feed<I, O>
where
    I: Input,
    O: Output<I::Output>
{
    fn execute(&mut self) {
        self.output.accept(self.input.get())
    }
}

// Closures act as stages directly

impl<T, F> Input for F
where
    F: FnMut() -> T
{
    type Output = T;

    fn get(&mut self) -> T {
        self()
    }
}

impl<I, O, F> Processor<I> for F
where
    F: FnMut(I) -> O
{
    type Output = O;

    fn apply(&mut self, input: I) -> O {
        self(input)
    }
}

impl<T, F> Output<T> for F
where
    F: FnMut(T)
{
    fn accept(&mut self, value: T) {
        self(value)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_then_feed() {
        let sink = Rc::new(Cell::new(0i64));
        let sink_clone = sink.clone();

        let mut tick = (|| 2i64)
            .then(|x: i64| x * 10)
            .feed(move |x: i64| sink_clone.set(x));

        tick.execute();
        assert_eq!(sink.get(), 20);
    }

    #[test]
    fn test_after() {
        let sink = Rc::new(Cell::new(0i64));
        let sink_clone = sink.clone();

        let mut output = (move |x: i64| sink_clone.set(x))
            .after(|x: i64| x + 1);

        output.accept(5);
        assert_eq!(sink.get(), 6);
    }

    #[test]
    fn test_input_called_once_per_tick() {
        let count = Rc::new(Cell::new(0u32));
        let count_clone = count.clone();

        let mut tick = (move || {
            count_clone.set(count_clone.get() + 1);
            1i64
        })
        .then(|x: i64| x)
        .feed(|_x: i64| ());

        tick.execute();
        tick.execute();
        assert_eq!(count.get(), 2);
    }
}
