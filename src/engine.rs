/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
};

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::{generate_moves, EngineCommand, Evaluator, Game};

/// Interactive text front-end for a [`Game`] against the computer.
#[derive(Debug)]
pub struct Engine {
    /// The game being played.
    game: Game,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,
}

impl Engine {
    /// Constructs a new [`Engine`] around `game`, to be executed with [`Engine::run`].
    pub fn new(game: Game) -> Self {
        let (sender, receiver) = channel();

        Self {
            game,
            sender,
            receiver,
        }
    }

    #[inline(always)]
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits on received commands.
    /// The computer plays its turns as soon as they come up.
    pub fn run(&mut self) -> Result<()> {
        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                eprintln!("Input handler thread stopping after fatal error: {err}");
            }
        });

        println!(
            "You play {}. Type `help` for a list of commands.",
            self.game.human_side()
        );
        self.display();
        self.advance();

        // Loop on user input
        while let Ok(cmd) = self.receiver.recv() {
            match cmd {
                EngineCommand::Display => self.display(),

                EngineCommand::Moves => self.moves(),

                EngineCommand::Move { from, to } => {
                    if self.game.try_human_move(from, to) {
                        self.display();
                    } else {
                        eprintln!("Illegal move: {from} to {to}");
                    }
                }

                EngineCommand::Eval => println!("{}", Evaluator::new(self.game.current_board())),

                EngineCommand::New => {
                    self.game.new_game();
                    self.display();
                }

                EngineCommand::Save => self.save(),

                EngineCommand::Quit => {
                    self.save();
                    break;
                }
            }

            self.advance();
        }

        Ok(())
    }

    /// Plays every turn that doesn't need the human: computer moves, and forced passes.
    fn advance(&mut self) {
        loop {
            if let Some(outcome) = self.game.outcome() {
                println!(
                    "Game over: {outcome} after {} turns. Type `new` to play again.",
                    self.game.turns()
                );
                return;
            }

            if self.game.is_ai_turn() {
                if self.game.apply_ai_move().is_some() {
                    println!("Computer ({}) moved:", self.game.ai_side());
                    self.display();
                } else {
                    println!("Computer ({}) has no legal moves and passes.", self.game.ai_side());
                }
            } else if self.game.pass_if_stuck() {
                println!("You have no legal moves and pass.");
            } else {
                return;
            }
        }
    }

    /// Executes the `display` command, printing the current board.
    fn display(&self) {
        println!("{}", self.game.current_board());
        println!(
            "Turn {} / {}, {} to move",
            self.game.turns(),
            self.game.config().turn_ceiling,
            self.game.side_to_move()
        );
    }

    /// Executes the `moves` command.
    fn moves(&self) {
        let moves = generate_moves(self.game.current_board(), self.game.side_to_move());

        let moves_string = if moves.is_empty() {
            String::from("(none)")
        } else {
            moves
                .into_iter()
                .map(|mv| mv.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("{moves_string}");
    }

    /// Executes the `save` command. Failing to save is reported, but never ends the game.
    fn save(&mut self) {
        if let Err(err) = self.game.save() {
            eprintln!("Failed to save value table: {err}");
        }
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(256);

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing commands")?;

        // For ctrl + d
        if 0 == bytes {
            sender
                .send(EngineCommand::Quit)
                .context("Failed to send 'quit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        let buf = buffer.trim();
        if buf.is_empty() {
            continue;
        }

        match EngineCommand::try_parse_from(buf.split_ascii_whitespace()) {
            Ok(cmd) => sender
                .send(cmd)
                .context("Failed to send command to engine")?,

            // Includes `help`, which clap reports as an "error"
            Err(err) => eprintln!("{err}"),
        }
    }
}
