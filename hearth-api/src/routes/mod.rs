/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `me`: The caller's account and house lists
/// - `houses`: Browse, create, join and leave houses
/// - `tasks`: Chores and the calendar feed
/// - `restrictions`: Dietary and schedule restrictions

pub mod health;
pub mod houses;
pub mod me;
pub mod restrictions;
pub mod tasks;
