use crate::application::catalog::RepositorySearch;

pub trait Console {
    fn write_line(&mut self, line: &str);

    /// Prompt text without a trailing newline.
    fn write_prompt(&mut self, prompt: &str);

    /// One trimmed line, `None` once input is exhausted.
    fn read_line(&mut self) -> std::io::Result<Option<String>>;

    /// Reads keystrokes with a live completion hint; `None` means nothing was selected.
    fn read_with_autocomplete(
        &mut self,
        search: &dyn RepositorySearch,
    ) -> std::io::Result<Option<String>>;

    fn blank_line(&mut self) {
        self.write_line("");
    }

    fn prompt_line(&mut self, prompt: &str) -> std::io::Result<String> {
        self.write_prompt(prompt);
        Ok(self.read_line()?.unwrap_or_default())
    }

    fn confirm(&mut self, prompt: &str) -> std::io::Result<bool> {
        let answer = self.prompt_line(prompt)?.to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}
