mod control_loop;
mod harness;
mod server_session;
mod shutdown;
