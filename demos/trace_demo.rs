use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    unagi_trace::demo_apps::run_trace_demo(std::env::args().skip(1))
}
