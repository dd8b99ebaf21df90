mod pipeline;
mod stubs;
