//! Reusable stage chains
//!
//! A [`Pipe`] records a chain of `map`/`filter` stages without spawning
//! anything. Each [`Pipe::apply`] spawns a fresh copy of the chain on the
//! given stream, so one pipe can feed any number of streams.

use std::sync::Arc;

use crate::stream::Stream;

type Build<I, O> = Arc<dyn Fn(Stream<I>) -> Stream<O> + Send + Sync + 'static>;

pub struct Pipe<I, O> {
    build: Build<I, O>,
    stages: Vec<&'static str>,
}

impl<I, O> Clone for Pipe<I, O> {
    fn clone(&self) -> Self {
        Pipe {
            build: Arc::clone(&self.build),
            stages: self.stages.clone(),
        }
    }
}

impl<I> Pipe<I, I>
where
    I: Send + 'static,
{
    /// A pipe with no stages; applying it hands the stream back untouched
    pub fn identity() -> Self {
        Pipe {
            build: Arc::new(|input: Stream<I>| input),
            stages: Vec::new(),
        }
    }
}

impl<I, O> Pipe<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    fn push<P, S>(self, label: &'static str, stage: S) -> Pipe<I, P>
    where
        S: Fn(Stream<O>) -> Stream<P> + Send + Sync + 'static,
    {
        let build = self.build;
        let mut stages = self.stages;
        stages.push(label);
        Pipe {
            build: Arc::new(move |input: Stream<I>| stage(build(input))),
            stages,
        }
    }

    /// Append a `map` stage
    pub fn map<P, F>(self, f: F) -> Pipe<I, P>
    where
        P: Send + 'static,
        F: Fn(O) -> P + Send + Sync + Clone + 'static,
    {
        self.push("map", move |input: Stream<O>| input.map(f.clone()))
    }

    /// Append a `filter` stage
    pub fn filter<F>(self, predicate: F) -> Pipe<I, O>
    where
        F: Fn(&O) -> bool + Send + Sync + Clone + 'static,
    {
        self.push("filter", move |input: Stream<O>| {
            input.filter(predicate.clone())
        })
    }

    /// Append every stage of `next` after this pipe's stages
    pub fn then<P>(self, next: Pipe<O, P>) -> Pipe<I, P>
    where
        P: Send + 'static,
    {
        let first = self.build;
        let second = next.build;
        let mut stages = self.stages;
        stages.extend(next.stages);
        Pipe {
            build: Arc::new(move |input: Stream<I>| second(first(input))),
            stages,
        }
    }

    /// Labels of the stages `apply` will spawn, upstream first
    pub fn stages(&self) -> &[&'static str] {
        &self.stages
    }

    /// Spawn the recorded stages on `input`
    pub fn apply(&self, input: Stream<I>) -> Stream<O> {
        (self.build)(input)
    }
}

/// Single-stage `map` pipe
pub fn map<I, O, F>(f: F) -> Pipe<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
    F: Fn(I) -> O + Send + Sync + Clone + 'static,
{
    Pipe::identity().map(f)
}

/// Single-stage `filter` pipe
pub fn filter<I, F>(predicate: F) -> Pipe<I, I>
where
    I: Send + 'static,
    F: Fn(&I) -> bool + Send + Sync + Clone + 'static,
{
    Pipe::identity().filter(predicate)
}

impl<T> Stream<T>
where
    T: Send + 'static,
{
    /// Run this stream through a pipe
    pub fn through<O>(self, pipe: &Pipe<T, O>) -> Stream<O>
    where
        O: Send + 'static,
    {
        pipe.apply(self)
    }
}
