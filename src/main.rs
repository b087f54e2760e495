//! `cliventory` binary: every executor is an executable file under the
//! working directory, named by its inventory `executor` path.

use cliventory::{App, ExecutorRegistry};

fn main() {
    App::new(ExecutorRegistry::new()).run()
}
