//! Raw `vte::Perform` pass for OSC sequences that `vte::ansi::Handler`
//! doesn't surface: OSC 7 (working directory) and OSC 133 (shell
//! integration). Driven by a second, independent `vte::Parser` over the
//! same bytes the main `vte::ansi::Processor` sees — a single `Handler`
//! dispatch table has no hook for either of these.

use vte::Perform;

use super::command::ShellIntegration;

pub(super) struct RawInterceptor<'a> {
    pub cwd: &'a mut Option<String>,
    pub shell: &'a mut ShellIntegration,
}

impl Perform for RawInterceptor<'_> {
    fn osc_dispatch(&mut self, params: &[&[u8]], _bell_terminated: bool) {
        if params.is_empty() || params[0].is_empty() {
            return;
        }
        match params[0] {
            // OSC 7 — current working directory. Format: `7;file://host/path`.
            b"7" => {
                if params.len() < 2 {
                    return;
                }
                let uri = std::str::from_utf8(params[1]).unwrap_or_default();
                let path = uri.strip_prefix("file://").map_or(uri, |rest| {
                    rest.find('/').map_or(rest, |slash| rest.split_at(slash).1)
                });
                if !path.is_empty() {
                    *self.cwd = Some(path.to_owned());
                }
            }
            // OSC 133 — shell-integration prompt markers: A/B/C/D[;exit_code].
            b"133" => {
                let Some(kind) = params.get(1).and_then(|p| p.first()) else { return };
                match kind {
                    b'A' => self.shell.mark_prompt_start(),
                    b'B' => self.shell.mark_command_start(),
                    b'C' => self.shell.mark_output_start(),
                    b'D' => {
                        let exit_code = params
                            .get(2)
                            .and_then(|p| std::str::from_utf8(p).ok())
                            .and_then(|s| s.parse::<i32>().ok());
                        self.shell.mark_command_end(exit_code);
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }
}
