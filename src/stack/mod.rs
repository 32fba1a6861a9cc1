//! Layout stacks: resolving the chain of layouts and folding it
//!
//! Given a starting layout, [`resolve_stack`] follows each template's layout
//! reference to build the stack. [`Folder`] then walks the stack, nesting
//! each layout inside the previous one and merging their data.
//!
//! ```text
//! post  (layout: base)      <article>{% body %}</article>
//! base  (layout: false)     <html>{% body %}</html>
//!
//! resolve("post")  ->  ["base", "post"]
//! fold             ->  <html><article>{% body %}</article></html>
//! ```

mod fold;
mod resolver;

pub use fold::{Folded, Folder};
pub use resolver::{resolve_stack, CyclePolicy, ResolutionContext};
