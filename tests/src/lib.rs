mod dispatch;
mod utils;
