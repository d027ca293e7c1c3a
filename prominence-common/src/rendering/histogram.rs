/// A static SVG frequency histogram for inclusion in HTML reports.
pub struct Histogram {
    pub width: f64,
    pub height: f64,
    pub freq_data: Vec<usize>,
    pub min_bin_val: f64,
    pub bin_width: f64,
    pub x_axis_label: String,
    pub y_axis_label: String,
}

impl Histogram {
    pub fn get_svg(&self) -> String {
        let plot_left_margin = 70.0;
        let plot_right_margin = 30.0;
        let plot_bottom_margin = 70.0;
        let plot_top_margin = 20.0;
        let plot_width = self.width - plot_left_margin - plot_right_margin;
        let plot_height = self.height - plot_bottom_margin - plot_top_margin;
        let origin_x = plot_left_margin;
        let origin_y = plot_top_margin + plot_height;

        let bin_color = "#47a3ff";
        let bin_stroke_color = "white";
        let grid_line_color = "rgb(120,120,120)";

        let max_freq = *self.freq_data.iter().max().unwrap_or(&1) as f64;
        let max_freq = if max_freq > 0.0 { max_freq } else { 1.0 };
        let num_bins = self.freq_data.len().max(1);
        let bar_width = plot_width / num_bins as f64;

        let mut s = String::new();
        s.push_str(&format!(
            "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
            self.width, self.height
        ));
        s.push_str(&format!(
            "<rect width=\"{}\" height=\"{}\" fill=\"white\"/>\n",
            self.width, self.height
        ));

        // bars
        for (i, &freq) in self.freq_data.iter().enumerate() {
            let bar_height = plot_height * freq as f64 / max_freq;
            let x = origin_x + i as f64 * bar_width;
            let y = origin_y - bar_height;
            s.push_str(&format!(
                "<rect class=\"bin\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"0.5\"/>\n",
                x, y, bar_width, bar_height, bin_color, bin_stroke_color
            ));
        }

        // axes
        s.push_str(&format!(
            "<line x1=\"{0:.2}\" y1=\"{1:.2}\" x2=\"{2:.2}\" y2=\"{1:.2}\" stroke=\"{3}\" stroke-width=\"1\"/>\n",
            origin_x,
            origin_y,
            origin_x + plot_width,
            grid_line_color
        ));
        s.push_str(&format!(
            "<line x1=\"{0:.2}\" y1=\"{1:.2}\" x2=\"{0:.2}\" y2=\"{2:.2}\" stroke=\"{3}\" stroke-width=\"1\"/>\n",
            origin_x, origin_y, plot_top_margin, grid_line_color
        ));

        // x-axis tick labels, one every quarter of the range
        for t in 0..5 {
            let frac = t as f64 / 4.0;
            let x = origin_x + frac * plot_width;
            let val = self.min_bin_val + frac * self.bin_width * num_bins as f64;
            s.push_str(&format!(
                "<line x1=\"{0:.2}\" y1=\"{1:.2}\" x2=\"{0:.2}\" y2=\"{2:.2}\" stroke=\"{3}\" stroke-width=\"1\"/>\n",
                x,
                origin_y,
                origin_y + 8.0,
                grid_line_color
            ));
            s.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"11\" font-family=\"sans-serif\" text-anchor=\"middle\">{:.1}</text>\n",
                x,
                origin_y + 24.0,
                val
            ));
        }

        // y-axis max label
        s.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"11\" font-family=\"sans-serif\" text-anchor=\"end\">{}</text>\n",
            origin_x - 6.0,
            plot_top_margin + 10.0,
            max_freq as usize
        ));
        s.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"11\" font-family=\"sans-serif\" text-anchor=\"end\">0</text>\n",
            origin_x - 6.0, origin_y
        ));

        // axis labels
        s.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"12\" font-family=\"sans-serif\" text-anchor=\"middle\">{}</text>\n",
            origin_x + plot_width / 2.0,
            origin_y + 48.0,
            self.x_axis_label
        ));
        s.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"12\" font-family=\"sans-serif\" text-anchor=\"middle\" transform=\"rotate(-90 {:.2} {:.2})\">{}</text>\n",
            origin_x - 48.0,
            plot_top_margin + plot_height / 2.0,
            origin_x - 48.0,
            plot_top_margin + plot_height / 2.0,
            self.y_axis_label
        ));

        s.push_str("</svg>\n");
        s
    }
}

#[cfg(test)]
mod test {
    use super::Histogram;

    #[test]
    fn test_svg_contains_bars() {
        let h = Histogram {
            width: 600.0,
            height: 400.0,
            freq_data: vec![1, 5, 3, 0, 2],
            min_bin_val: 100.0,
            bin_width: 10.0,
            x_axis_label: "Elevation".to_string(),
            y_axis_label: "Frequency".to_string(),
        };
        let svg = h.get_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("class=\"bin\"").count(), 5);
        assert!(svg.contains("Elevation"));
    }

    #[test]
    fn test_empty_histogram_is_valid() {
        let h = Histogram {
            width: 600.0,
            height: 400.0,
            freq_data: vec![],
            min_bin_val: 0.0,
            bin_width: 1.0,
            x_axis_label: "x".to_string(),
            y_axis_label: "y".to_string(),
        };
        let svg = h.get_svg();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("class=\"bin\"").count(), 0);
    }
}
