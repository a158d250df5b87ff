pub mod schedule;

pub use schedule::{ReturnFlightReport, Schedule};

#[cfg(test)]
mod tests {
    pub mod utils;

    mod add;
    mod cargo;
    mod complete;
    mod proptests;
    mod queries;
    mod returns;
}
