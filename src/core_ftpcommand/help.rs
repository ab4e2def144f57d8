use crate::session::Session;

const USAGE: &[&str] = &[
    "user <username>",
    "pass <password>",
    "acct <account-information>",
    "cwd  <pathname>",
    "cdup",
    "smnt <pathname>",
    "quit",
    "rein",
    "port <host-port>",
    "pasv",
    "type <type-code>",
    "stru <structure-code>",
    "mode <mode-code>",
    "retr <pathname>",
    "stor <pathname>",
    "stou",
    "appe <pathname>",
    "allo [r] <decimal-integer>",
    "rest <marker>",
    "rnfr <pathname>",
    "rnto <pathname>",
    "abor",
    "dele <pathname>",
    "rmd  <pathname>",
    "mkd  <pathname>",
    "pwd",
    "list [<pathname>]",
    "nlst [<pathname>]",
    "site <string>",
    "syst",
    "help [<string>]",
    "noop",
];

/// Handles the HELP FTP command.
///
/// With an argument, replies with the usage of the first command it
/// prefixes; otherwise lists every command.
pub fn handle_help_command(session: &mut Session, arg: &str) {
    let wanted = arg.to_ascii_lowercase();
    if !wanted.is_empty() {
        if let Some(usage) = USAGE.iter().find(|usage| usage.starts_with(&wanted)) {
            session.reply.add(214, format!("Usage: {}", usage));
            return;
        }
    }

    session.reply.add(214, "The following commands are recognized:");
    for usage in USAGE {
        session.reply.append(*usage);
    }
}
