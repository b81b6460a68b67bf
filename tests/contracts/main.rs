mod context;
mod structured_response;
